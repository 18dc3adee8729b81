//! ironwave.toml 통합 설정 테스트
//!
//! - ironwave.toml.example 파싱 테스트
//! - 부분 설정 (일부 섹션만) 로딩 테스트
//! - 설정 파일이 없을 때의 기본값 동작
//! - 환경변수 우선순위 테스트

use std::io::Write;

use ironwave_core::config::{IronwaveConfig, KNOWN_CAPABILITIES};
use ironwave_core::error::{ConfigError, IronwaveError};

// =============================================================================
// ironwave.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_successfully() {
    let content = include_str!("../../../ironwave.toml.example");
    let config = IronwaveConfig::parse(content).expect("example config should parse");

    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.general.log_format, "json");
    assert_eq!(config.scan.interface, "wlan0");
    assert_eq!(config.api.port, 8080);
}

#[test]
fn example_config_passes_validation() {
    let content = include_str!("../../../ironwave.toml.example");
    let config = IronwaveConfig::parse(content).expect("should parse");
    config
        .validate()
        .expect("example config should pass validation");
}

#[test]
fn example_config_matches_code_defaults() {
    let content = include_str!("../../../ironwave.toml.example");
    let example = IronwaveConfig::parse(content).expect("should parse");
    let defaults = IronwaveConfig::default();

    assert_eq!(example.general.pid_file, defaults.general.pid_file);
    assert_eq!(example.scan.capabilities, defaults.scan.capabilities);
    assert_eq!(
        example.scan.probe_timeout_secs,
        defaults.scan.probe_timeout_secs
    );
    assert_eq!(
        example.scan.scan_interval_secs,
        defaults.scan.scan_interval_secs
    );
    assert_eq!(example.scan.history_size, defaults.scan.history_size);
    assert_eq!(
        example.scan.reprobe_after_empty_cycles,
        defaults.scan.reprobe_after_empty_cycles
    );
    assert_eq!(
        example.scan.allow_demo_fallback,
        defaults.scan.allow_demo_fallback
    );
    assert_eq!(example.api.listen_addr, defaults.api.listen_addr);
    assert_eq!(example.metrics.enabled, defaults.metrics.enabled);
    assert_eq!(example.metrics.port, defaults.metrics.port);
    assert_eq!(example.metrics.endpoint, defaults.metrics.endpoint);
}

#[test]
fn example_config_lists_every_known_capability() {
    let content = include_str!("../../../ironwave.toml.example");
    let config = IronwaveConfig::parse(content).expect("should parse");
    for name in KNOWN_CAPABILITIES {
        assert!(
            config.scan.capabilities.iter().any(|c| c == name),
            "example config should list '{name}'"
        );
    }
}

// =============================================================================
// 부분 설정 테스트
// =============================================================================

#[test]
fn partial_config_api_only() {
    let config = IronwaveConfig::parse("[api]\nport = 9090\nlisten_addr = \"127.0.0.1\"\n")
        .expect("should parse");
    assert_eq!(config.api.port, 9090);
    assert_eq!(config.api.listen_addr, "127.0.0.1");
    assert!(config.api.enabled);
    assert_eq!(config.scan.interface, "wlan0");
}

#[test]
fn partial_config_restricted_capabilities() {
    let toml = r#"
[scan]
capabilities = ["dumpsys", "proc"]
allow_demo_fallback = false
"#;
    let config = IronwaveConfig::parse(toml).expect("should parse");
    assert_eq!(config.scan.capabilities, vec!["dumpsys", "proc"]);
    assert!(!config.scan.allow_demo_fallback);
    config.validate().expect("should validate");
}

#[test]
fn wrong_type_is_parse_error() {
    let result = IronwaveConfig::parse("[scan]\nhistory_size = \"many\"\n");
    assert!(matches!(
        result,
        Err(IronwaveError::Config(ConfigError::ParseFailed { .. }))
    ));
}

// =============================================================================
// 파일 로딩
// =============================================================================

#[tokio::test]
#[serial_test::serial]
async fn load_reads_file_and_validates() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(file, "[scan]\ninterface = \"wlp2s0\"\nhistory_size = 40").expect("write");

    let config = IronwaveConfig::load(file.path()).await.expect("should load");
    assert_eq!(config.scan.interface, "wlp2s0");
    assert_eq!(config.scan.history_size, 40);
}

#[tokio::test]
#[serial_test::serial]
async fn load_rejects_invalid_values_in_file() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(file, "[scan]\nhistory_size = 0").expect("write");

    let result = IronwaveConfig::load(file.path()).await;
    assert!(matches!(
        result,
        Err(IronwaveError::Config(ConfigError::InvalidValue { .. }))
    ));
}

#[tokio::test]
#[serial_test::serial]
async fn load_or_default_without_file_uses_defaults() {
    let config = IronwaveConfig::load_or_default("/nonexistent/dir/ironwave.toml")
        .await
        .expect("missing file should fall back to defaults");
    assert_eq!(config.scan.interface, "wlan0");
    assert_eq!(config.api.port, 8080);
}

#[tokio::test]
#[serial_test::serial]
async fn load_or_default_still_reports_parse_errors() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(file, "[scan\nbroken").expect("write");

    let result = IronwaveConfig::load_or_default(file.path()).await;
    assert!(matches!(
        result,
        Err(IronwaveError::Config(ConfigError::ParseFailed { .. }))
    ));
}

// =============================================================================
// 환경변수 우선순위
// =============================================================================

#[test]
#[serial_test::serial]
fn env_override_takes_precedence_over_toml() {
    let original = std::env::var("IRONWAVE_SCAN_INTERFACE").ok();
    // SAFETY: serial 테스트로 실행되어 다른 스레드가 환경변수를 읽지 않습니다.
    unsafe {
        std::env::set_var("IRONWAVE_SCAN_INTERFACE", "wlan9");
    }

    let mut config = IronwaveConfig::parse("[scan]\ninterface = \"wlan1\"\n").expect("parse");
    config.apply_env_overrides();
    assert_eq!(config.scan.interface, "wlan9");

    unsafe {
        match original {
            Some(val) => std::env::set_var("IRONWAVE_SCAN_INTERFACE", val),
            None => std::env::remove_var("IRONWAVE_SCAN_INTERFACE"),
        }
    }
}

#[test]
#[serial_test::serial]
fn env_override_csv_for_capabilities() {
    let original = std::env::var("IRONWAVE_SCAN_CAPABILITIES").ok();
    // SAFETY: serial 테스트로 실행되어 다른 스레드가 환경변수를 읽지 않습니다.
    unsafe {
        std::env::set_var("IRONWAVE_SCAN_CAPABILITIES", "termux, proc");
    }

    let mut config = IronwaveConfig::default();
    config.apply_env_overrides();
    assert_eq!(config.scan.capabilities, vec!["termux", "proc"]);

    unsafe {
        match original {
            Some(val) => std::env::set_var("IRONWAVE_SCAN_CAPABILITIES", val),
            None => std::env::remove_var("IRONWAVE_SCAN_CAPABILITIES"),
        }
    }
}

#[tokio::test]
#[serial_test::serial]
async fn env_override_applies_without_config_file() {
    let original = std::env::var("IRONWAVE_API_PORT").ok();
    // SAFETY: serial 테스트로 실행되어 다른 스레드가 환경변수를 읽지 않습니다.
    unsafe {
        std::env::set_var("IRONWAVE_API_PORT", "18080");
    }

    let config = IronwaveConfig::load_or_default("/nonexistent/ironwave.toml")
        .await
        .expect("should fall back");
    assert_eq!(config.api.port, 18080);

    unsafe {
        match original {
            Some(val) => std::env::set_var("IRONWAVE_API_PORT", val),
            None => std::env::remove_var("IRONWAVE_API_PORT"),
        }
    }
}
