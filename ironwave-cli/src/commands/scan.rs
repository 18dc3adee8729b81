//! `ironwave scan` command handler

use std::path::Path;

use tracing::info;

use ironwave_core::config::IronwaveConfig;
use ironwave_scanner::{CommandRunner, ScannerConfig, SignalScanner, SignalScannerBuilder};

use crate::cli::ScanArgs;
use crate::commands::signals::SnapshotReport;
use crate::error::CliError;
use crate::output::OutputWriter;

/// Execute the `scan` command.
pub async fn execute(
    args: ScanArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = IronwaveConfig::load_or_default(config_path).await?;
    let scanner = SignalScannerBuilder::new()
        .config(ScannerConfig::from_core(&config.scan))
        .build()?;

    let report = scan(&scanner).await?;

    if args.raw {
        writer.render_json_line(&report)?;
    } else {
        writer.render(&report)?;
    }
    Ok(())
}

/// Run one acquisition cycle without starting the loop.
pub async fn scan<R: CommandRunner>(scanner: &SignalScanner<R>) -> Result<SnapshotReport, CliError> {
    info!(interface = %scanner.config().interface, "running single scan");

    let snapshot = scanner.scan_once().await?;

    info!(
        method = %snapshot.method,
        signals = snapshot.len(),
        "scan complete"
    );
    Ok(SnapshotReport::from(snapshot.as_ref()))
}
