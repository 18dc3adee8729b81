//! CLI argument definitions for ironwave-daemon.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use ironwave_core::config::IronwaveConfig;

/// Ironwave wireless signal monitoring daemon.
///
/// Detects the available scan capability, publishes signal snapshots
/// on a timer and serves them over HTTP.
#[derive(Parser, Debug)]
#[command(name = "ironwave-daemon")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to ironwave.toml configuration file.
    ///
    /// The file is optional. When it does not exist the daemon runs on defaults.
    #[arg(short, long, default_value = "ironwave.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Validate configuration file and exit without starting the daemon.
    #[arg(long)]
    pub validate: bool,

    /// Override PID file path (takes precedence over config file).
    #[arg(long)]
    pub pid_file: Option<String>,
}

impl DaemonCli {
    /// CLI 오버라이드를 설정에 적용합니다. 적용 후 다시 검증해야 합니다.
    pub fn apply_overrides(&self, config: &mut IronwaveConfig) {
        if let Some(level) = &self.log_level {
            config.general.log_level.clone_from(level);
        }
        if let Some(format) = &self.log_format {
            config.general.log_format.clone_from(format);
        }
        if let Some(pid_file) = &self.pid_file {
            config.general.pid_file.clone_from(pid_file);
        }
    }
}
