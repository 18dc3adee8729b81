//! Integration tests for `ironwave config`.
//!
//! Tests config loading behaviour the command relies on, with real TOML files.

use std::fs;
use tempfile::TempDir;

use ironwave_core::config::IronwaveConfig;
use ironwave_core::error::{ConfigError, IronwaveError};

#[tokio::test]
async fn test_config_validate_valid_toml() {
    // Given: A valid config file
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("ironwave.toml");

    let valid_config = r#"
[general]
log_level = "info"
log_format = "pretty"

[scan]
interface = "wlp3s0"
capabilities = ["wpa_cli", "proc"]
history_size = 45

[api]
enabled = true
port = 8081

[metrics]
enabled = false
"#;

    fs::write(&config_path, valid_config).expect("should write config");

    // When: Loading the config
    let config = IronwaveConfig::load(&config_path)
        .await
        .expect("valid config should load successfully");

    // Then: Values from the file are applied
    assert_eq!(config.scan.interface, "wlp3s0");
    assert_eq!(config.scan.capabilities, vec!["wpa_cli", "proc"]);
    assert_eq!(config.api.port, 8081);
}

#[tokio::test]
async fn test_config_validate_malformed_toml() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("bad.toml");

    fs::write(&config_path, "[scan\ninterface = \"wlan0\"\n").expect("should write bad config");

    let result = IronwaveConfig::load(&config_path).await;

    assert!(
        matches!(result, Err(IronwaveError::Config(ConfigError::ParseFailed { .. }))),
        "malformed TOML should fail to parse"
    );
}

#[tokio::test]
async fn test_config_validate_missing_file() {
    let config_path = std::path::PathBuf::from("/nonexistent/ironwave.toml");

    let result = IronwaveConfig::load(&config_path).await;

    assert!(
        matches!(result, Err(IronwaveError::Config(ConfigError::FileNotFound { .. }))),
        "missing file should fail to load"
    );
}

#[tokio::test]
async fn test_config_show_missing_file_uses_defaults() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("absent.toml");

    let config = IronwaveConfig::load_or_default(&config_path)
        .await
        .expect("missing file should fall back to defaults");

    assert_eq!(config.scan.interface, "wlan0");
    assert!(config.api.enabled);
    assert!(!config.metrics.enabled);
}

#[tokio::test]
async fn test_config_validate_empty_file_uses_defaults() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("empty.toml");

    fs::write(&config_path, "").expect("should write empty file");

    let config = IronwaveConfig::load(&config_path)
        .await
        .expect("empty file should load with defaults");
    assert_eq!(config.scan.history_size, 30);
}

#[tokio::test]
async fn test_config_validate_rejects_unknown_capability() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("ironwave.toml");

    fs::write(&config_path, "[scan]\ncapabilities = [\"netsh\"]\n").expect("should write config");

    let err = IronwaveConfig::load(&config_path)
        .await
        .expect_err("unknown capability should be rejected");
    assert!(err.to_string().contains("netsh"), "got: {err}");
}

#[tokio::test]
async fn test_config_validate_rejects_shell_metacharacters_in_interface() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("ironwave.toml");

    fs::write(&config_path, "[scan]\ninterface = \"wlan0; reboot\"\n")
        .expect("should write config");

    let result = IronwaveConfig::load(&config_path).await;
    assert!(result.is_err(), "interface must be a plain name");
}

#[test]
fn test_config_roundtrips_through_toml_show_output() {
    // `config show` prints TOML; what it prints must load back unchanged
    let original = IronwaveConfig::default();
    let rendered = toml::to_string_pretty(&original).expect("should serialize");

    let reparsed = IronwaveConfig::parse(&rendered).expect("shown config should parse");
    assert_eq!(reparsed.scan.capabilities, original.scan.capabilities);
    assert_eq!(reparsed.metrics.endpoint, original.metrics.endpoint);
    reparsed.validate().expect("shown config should be valid");
}
