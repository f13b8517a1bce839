use std::path::PathBuf;

use clap::Parser;

/// Interactively builds a certificate signing request and its RSA key.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// the config file.
    #[arg(long, short)]
    pub config: Option<PathBuf>,
    /// where the signing request is written.
    #[arg(long)]
    pub csr_dir: Option<PathBuf>,
    /// where the private key is written.
    #[arg(long)]
    pub key_dir: Option<PathBuf>,
    /// RSA modulus size.
    #[arg(long, value_parser = clap::value_parser!(u32).range(2048..=8192))]
    pub key_bits: Option<u32>,
}
