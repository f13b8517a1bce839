use std::io;

use anyhow::Context;
use clap::Parser;
use directories::ProjectDirs;
use rustyline::DefaultEditor;

use crate::{
    cert_sign_request::WrittenArtifacts,
    cli::Cli,
    config::{create_plan, read_config},
    utils::{exit_with_msg, LineSource},
};

mod cert_sign_request;
mod cli;
mod config;
mod error;
mod utils;

fn main() {
    if let Err(e) = env_logger::try_init() {
        eprintln!("could not set up env_logger: {e}");
    }
    let cli = Cli::parse();

    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(err) => exit_with_msg(
            &mut io::stdin(),
            &format!("The following error occurred: {err}"),
        ),
    };

    match session(cli, &mut rl) {
        Ok(written) => {
            println!("Signing request written to {}", written.csr_path.display());
            println!("Private key written to {}", written.key_path.display());
        }
        Err(err) => {
            exit_with_msg(&mut rl, &format!("The following error occurred: {err:#}"))
        }
    }
}

/// Everything after argument parsing that can fail.
fn session(
    cli: Cli,
    input: &mut impl LineSource,
) -> anyhow::Result<WrittenArtifacts> {
    let app = ProjectDirs::from("com", "csrgen", "csrgen")
        .context("can't determine the config directory")?;
    let config = read_config(app.config_dir(), &cli)?;
    let plan = create_plan(cli, config)?;
    Ok(cert_sign_request::run(&plan, input)?)
}
