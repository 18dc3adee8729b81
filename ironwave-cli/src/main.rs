//! Ironwave CLI
//!
//! Probes scan capabilities, runs one-shot scans, replays captured tool
//! output and inspects configuration without starting the daemon.

mod cli;
mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let writer = OutputWriter::new(cli.output);
    let config_path = cli.config.as_path();

    let result: Result<(), CliError> = match cli.command {
        Commands::Probe => commands::probe::execute(config_path, &writer).await,
        Commands::Scan(args) => commands::scan::execute(args, config_path, &writer).await,
        Commands::Parse(args) => commands::parse::execute(args, config_path, &writer).await,
        Commands::Config(args) => commands::config::execute(args, config_path, &writer).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}

/// Logs go to stderr so that stdout carries only command output.
///
/// Level precedence: `--log-level` > `RUST_LOG` > `warn`.
fn init_tracing(level_override: Option<&str>) {
    let filter = match level_override {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
