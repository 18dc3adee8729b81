//! `ironwave` 명령행 정의 (clap derive)
//!
//! 선언만 있고 I/O는 없습니다. 실행은 `commands` 모듈이 담당합니다.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Ironwave -- wireless signal acquisition and inspection.
///
/// Use `ironwave <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "ironwave", version, about, long_about = None)]
pub struct Cli {
    /// Path to the ironwave.toml configuration file.
    #[arg(short, long, global = true, default_value = "ironwave.toml")]
    pub config: PathBuf,

    /// Log level for stderr diagnostics (defaults to RUST_LOG, then warn).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// How results are written to stdout.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// 결과 출력 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned tables for a terminal.
    Text,
    /// Pretty-printed JSON document.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Try every scan capability and report which ones are usable.
    Probe,

    /// Run a single acquisition cycle and print the snapshot.
    Scan(ScanArgs),

    /// Replay captured tool output through a parser and the enricher.
    Parse(ParseArgs),

    /// Inspect or check the configuration file.
    Config(ConfigArgs),
}

// ---- scan ----

/// Run one acquisition cycle with the configured capabilities.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Print the `/api/scan` response body on a single line.
    #[arg(long)]
    pub raw: bool,
}

// ---- parse ----

/// Parse a saved scan output file offline.
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Capability name the output came from (iw, wpa_cli, termux, dumpsys, proc).
    #[arg(long)]
    pub kind: String,

    /// File containing the captured output.
    #[arg(long)]
    pub file: PathBuf,
}

// ---- config ----

/// Manage ironwave configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Load the file strictly and list what is wrong with it.
    Validate,
    /// Print the merged configuration as TOML.
    Show {
        /// Show only a specific section (general, scan, api, metrics).
        #[arg(long)]
        section: Option<String>,
    },
}
