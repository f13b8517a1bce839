use std::{io, num::ParseIntError, path::PathBuf};

use rustyline::error::ReadlineError;
use thiserror::Error;

/// Everything that ends a session early.
///
/// Rejected or duplicate SAN entries are not errors; the collector reports
/// those and keeps reading.
#[derive(Debug, Error)]
pub enum CsrError {
    #[error("couldn't parse {input:?} into a number")]
    InvalidSelection {
        input: String,
        #[source]
        source: ParseIntError,
    },
    #[error("input closed before a selection was made")]
    InputClosed,
    #[error("can't read from the terminal")]
    Input(#[from] ReadlineError),
    #[error("a common name is required")]
    MissingCommonName,
    #[error("couldn't get a password")]
    PasswordPrompt(#[source] io::Error),
    #[error("couldn't read password file {path:?}")]
    PasswordFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("key operation failed")]
    Crypto(#[from] openssl::error::ErrorStack),
    #[error("can't build the signing request")]
    Request(#[from] rcgen::Error),
    #[error("can't format the generation timestamp")]
    Timestamp(#[from] time::error::Format),
    #[error("can't write {path:?}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
