//! Shared snapshot report used by `scan` and `parse`

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use ironwave_core::types::{RiskBand, Signal, Snapshot};

use crate::output::Render;

/// Snapshot in the same shape as the `/api/scan` response body.
#[derive(Debug, Serialize)]
pub struct SnapshotReport {
    pub signals: Vec<Signal>,
    pub method: String,
    pub last_scan: Option<DateTime<Utc>>,
}

impl From<&Snapshot> for SnapshotReport {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            signals: snapshot.signals.clone(),
            method: snapshot.method.clone(),
            last_scan: snapshot.scanned_at,
        }
    }
}

impl Render for SnapshotReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let scanned = self
            .last_scan
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "never".to_owned());
        writeln!(w, "Method: {}", self.method.bold())?;
        writeln!(w, "Scanned at: {}", scanned)?;
        writeln!(w, "Signals: {}", self.signals.len())?;
        writeln!(w)?;

        if self.signals.is_empty() {
            writeln!(w, "{}", "No signals observed.".yellow())?;
            return Ok(());
        }

        writeln!(
            w,
            "{:<24} {:<18} {:>5} {:>4} {:<8} {:>8} Risk",
            "Label", "Identifier", "RSSI", "Ch", "Enc", "Dist(m)"
        )?;
        writeln!(w, "{}", "-".repeat(84))?;

        for s in &self.signals {
            let risk = format!("{:>3} {}", s.risk_score, s.risk_band());
            let risk_colored = match s.risk_band() {
                RiskBand::High => risk.red().bold(),
                RiskBand::Medium => risk.yellow(),
                RiskBand::Low => risk.green(),
            };
            let channel = s
                .channel
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_owned());

            writeln!(
                w,
                "{:<24} {:<18} {:>5} {:>4} {:<8} {:>8.2} {}",
                truncate(&s.label, 24),
                s.identifier,
                s.signal_strength,
                channel,
                s.encryption.to_string(),
                s.estimated_distance_m,
                risk_colored
            )?;
        }

        Ok(())
    }
}

fn truncate(label: &str, width: usize) -> String {
    if label.chars().count() <= width {
        return label.to_owned();
    }
    let mut out: String = label.chars().take(width.saturating_sub(1)).collect();
    out.push('~');
    out
}
