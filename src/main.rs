//! Migrant
//!
//! Schema migration generator for Lumen/Laravel applications.
//!
//! This is the main entry point for the command-line tool.

use clap::Parser;
use migrant_cli::Cli;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::FmtSubscriber;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over -v
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = migrant_cli::VERSION, "starting");

    match migrant_cli::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
