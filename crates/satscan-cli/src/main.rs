mod cli;
mod commands;
mod env_file;
mod error;
mod logging;
mod output;

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use crate::cli::Cli;
use crate::env_file::EnvFile;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    let env_file = env_file::load(&cli.env_file)?;
    logging::init(&cli.log_level);
    if env_file == EnvFile::Loaded {
        debug!(path = %cli.env_file.display(), "environment file loaded");
    }

    let data = commands::run(&cli).await?;
    output::render(&data, cli.pretty)?;
    Ok(())
}
