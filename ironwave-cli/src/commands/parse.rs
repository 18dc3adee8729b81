//! `ironwave parse` command handler
//!
//! Replays captured tool output through the parser and enricher, so a
//! field capture can be inspected on a machine without the tool.

use std::path::Path;

use chrono::Utc;
use tracing::info;

use ironwave_core::config::IronwaveConfig;
use ironwave_core::types::Snapshot;
use ironwave_scanner::{CapabilityKind, Enricher, RiskPolicy, ScannerConfig, parser_for};

use crate::cli::ParseArgs;
use crate::commands::signals::SnapshotReport;
use crate::error::CliError;
use crate::output::OutputWriter;

/// Execute the `parse` command.
pub async fn execute(
    args: ParseArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = IronwaveConfig::load_or_default(config_path).await?;
    let policy = ScannerConfig::from_core(&config.scan).risk_policy;

    let raw = tokio::fs::read_to_string(&args.file).await?;
    info!(
        kind = %args.kind,
        path = %args.file.display(),
        bytes = raw.len(),
        "parsing captured output"
    );

    let report = parse_capture(&args.kind, &raw, policy)?;
    writer.render(&report)?;
    Ok(())
}

/// Parse raw output for the named capability and enrich the result.
///
/// Unlike the acquisition loop, a wholly unparsable capture is an error here.
pub fn parse_capture(kind: &str, raw: &str, policy: RiskPolicy) -> Result<SnapshotReport, CliError> {
    let kind = CapabilityKind::from_name(kind).ok_or_else(|| {
        CliError::Command(format!(
            "unknown capability: {} (expected: iw, wpa_cli, termux, dumpsys, proc)",
            kind
        ))
    })?;
    let parser = parser_for(kind)
        .ok_or_else(|| CliError::Command(format!("{} has no output format to parse", kind)))?;

    let provisional = parser.parse(raw)?;
    let now = Utc::now();
    let signals = Enricher::new(policy).enrich_all(provisional, now);
    let snapshot = Snapshot::new(signals, kind.name(), now);

    Ok(SnapshotReport::from(&snapshot))
}
