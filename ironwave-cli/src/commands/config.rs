//! `ironwave config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use ironwave_core::config::IronwaveConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Section names accepted by `config show --section`.
const SECTIONS: [&str; 4] = ["general", "scan", "api", "metrics"];

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Execute the config validate subcommand.
///
/// Unlike the daemon, validation requires the file to exist.
///
/// # Errors
///
/// Returns `CliError::Config` if validation fails (missing file, invalid values, parse errors).
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let report = validate(config_path).await;
    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Load and validate a configuration file into a report.
pub async fn validate(config_path: &Path) -> ConfigValidationReport {
    let errors = match IronwaveConfig::load(config_path).await {
        Ok(_) => Vec::new(),
        Err(e) => vec![e.to_string()],
    };
    ConfigValidationReport {
        source: config_path.display().to_string(),
        valid: errors.is_empty(),
        errors,
    }
}

/// Execute the config show subcommand.
///
/// Displays the effective configuration (file + env overrides + defaults).
///
/// # Errors
///
/// Returns `CliError::Core` if loading fails or `CliError::Command` if the section name is invalid.
async fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %config_path.display(), "loading configuration");

    let config = IronwaveConfig::load_or_default(config_path).await?;
    let report = show(&config, config_path, section.as_deref())?;
    writer.render(&report)?;

    Ok(())
}

/// Serialize the whole configuration or a single section as TOML.
pub fn show(
    config: &IronwaveConfig,
    config_path: &Path,
    section: Option<&str>,
) -> Result<ConfigReport, CliError> {
    let config_toml = match section {
        None => toml::to_string_pretty(config),
        Some("general") => toml::to_string_pretty(&config.general),
        Some("scan") => toml::to_string_pretty(&config.scan),
        Some("api") => toml::to_string_pretty(&config.api),
        Some("metrics") => toml::to_string_pretty(&config.metrics),
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {} (expected: {})",
                other,
                SECTIONS.join(", ")
            )));
        }
    }
    .unwrap_or_else(|e| format!("(serialization error: {})", e));

    Ok(ConfigReport {
        source: config_path.display().to_string(),
        section: section.map(str::to_owned),
        config_toml,
    })
}

/// `config show` 결과
///
/// TOML 본문은 텍스트 출력 전용이며 JSON에는 포함되지 않습니다.
#[derive(Serialize)]
pub struct ConfigReport {
    pub source: String,
    /// 섹션 하나만 출력할 때의 섹션 이름
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let title = match &self.section {
            Some(section) => format!("[{section}]"),
            None => "effective configuration".to_owned(),
        };
        writeln!(w, "{} from {}", title.bold(), self.source)?;
        writeln!(w)?;
        write!(w, "{}", self.config_toml)
    }
}

/// `config validate` 결과
#[derive(Serialize)]
pub struct ConfigValidationReport {
    pub source: String,
    pub valid: bool,
    /// 검증 에러 (유효하면 비어 있음)
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let verdict = if self.valid {
            "VALID".green().bold()
        } else {
            "INVALID".red().bold()
        };
        writeln!(w, "{}: {}", self.source.bold(), verdict)?;
        for err in &self.errors {
            writeln!(w, "  - {}", err.red())?;
        }
        Ok(())
    }
}
