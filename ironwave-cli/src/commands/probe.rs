//! `ironwave probe` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use ironwave_core::config::IronwaveConfig;
use ironwave_scanner::{
    CommandRunner, ProbeOutcome, ProbeReport, ScannerConfig, SignalScanner, SignalScannerBuilder,
};

use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `probe` command.
pub async fn execute(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    let config = IronwaveConfig::load_or_default(config_path).await?;
    let scanner = SignalScannerBuilder::new()
        .config(ScannerConfig::from_core(&config.scan))
        .build()?;

    let report = probe(&scanner).await;
    writer.render(&report)?;
    Ok(())
}

/// Probe every capability without changing the scanner state.
pub async fn probe<R: CommandRunner>(scanner: &SignalScanner<R>) -> ProbeSummary {
    let config = scanner.config();
    info!(interface = %config.interface, "probing scan capabilities");

    let reports = scanner.probe_all().await;
    let selected = reports
        .iter()
        .find(|r| r.outcome.is_accepted())
        .map(|r| r.kind.name().to_owned());

    ProbeSummary {
        interface: config.interface.clone(),
        selected,
        demo_fallback: config.allow_demo_fallback,
        capabilities: reports.into_iter().map(ProbeEntry::from).collect(),
    }
}

/// Probe result for all capabilities in probe order.
#[derive(Debug, Serialize)]
pub struct ProbeSummary {
    pub interface: String,
    /// First usable capability, the one acquisition would select.
    pub selected: Option<String>,
    pub demo_fallback: bool,
    pub capabilities: Vec<ProbeEntry>,
}

#[derive(Debug, Serialize)]
pub struct ProbeEntry {
    pub method: String,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip)]
    pub result: ProbeOutcome,
}

impl From<ProbeReport> for ProbeEntry {
    fn from(report: ProbeReport) -> Self {
        let (outcome, detail) = match &report.outcome {
            ProbeOutcome::Accepted => ("accepted", None),
            ProbeOutcome::Disabled => ("disabled", None),
            ProbeOutcome::SkippedUnprivileged => ("skipped_unprivileged", None),
            ProbeOutcome::Failed(reason) => ("failed", Some(reason.clone())),
            ProbeOutcome::Rejected(reason) => ("rejected", Some(reason.clone())),
        };
        Self {
            method: report.kind.name().to_owned(),
            outcome,
            detail,
            result: report.outcome,
        }
    }
}

impl Render for ProbeSummary {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Interface: {}", self.interface.bold())?;
        writeln!(w)?;
        writeln!(w, "{:<10} {:<12} Detail", "Method", "Result")?;
        writeln!(w, "{}", "-".repeat(60))?;

        for entry in &self.capabilities {
            let (label, detail) = match &entry.result {
                ProbeOutcome::Accepted => ("ACCEPTED".green().bold(), ""),
                ProbeOutcome::Disabled => ("DISABLED".dimmed(), "not in scan.capabilities"),
                ProbeOutcome::SkippedUnprivileged => ("SKIPPED".yellow(), "requires root"),
                ProbeOutcome::Failed(reason) => ("FAILED".red(), reason.as_str()),
                ProbeOutcome::Rejected(reason) => ("REJECTED".red(), reason.as_str()),
            };
            // 색상 코드가 폭 계산을 깨뜨리지 않도록 직접 패딩
            let pad = 12usize.saturating_sub(label.chars().count());
            writeln!(
                w,
                "{:<10} {}{} {}",
                entry.method,
                label,
                " ".repeat(pad),
                detail
            )?;
        }

        writeln!(w)?;
        match (&self.selected, self.demo_fallback) {
            (Some(method), _) => writeln!(w, "Selected: {}", method.green().bold())?,
            (None, true) => writeln!(w, "Selected: {}", "demo (fallback)".yellow().bold())?,
            (None, false) => writeln!(w, "Selected: {}", "none".red().bold())?,
        }

        Ok(())
    }
}
