//! 설정 관리 -- ironwave.toml 파싱 및 런타임 설정
//!
//! [`IronwaveConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//! 설정 파일은 선택 사항이며, 없으면 기본값으로 동작합니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`IRONWAVE_SCAN_INTERFACE=wlan1` 형식)
//! 3. 설정 파일 (`ironwave.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), ironwave_core::error::IronwaveError> {
//! use ironwave_core::config::IronwaveConfig;
//!
//! // 파일이 있으면 로드, 없으면 기본값 + 환경변수 오버라이드
//! let config = IronwaveConfig::load_or_default("ironwave.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = IronwaveConfig::parse("[scan]\ninterface = \"wlan1\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ConfigError, IronwaveError};

/// 설정에서 사용할 수 있는 수집 방식 이름 (탐지 순서)
pub const KNOWN_CAPABILITIES: [&str; 5] = ["iw", "wpa_cli", "termux", "dumpsys", "proc"];

/// 인터페이스 이름 최대 길이 (IFNAMSIZ - 1)
const MAX_INTERFACE_LEN: usize = 15;
const MAX_PROBE_TIMEOUT_SECS: u64 = 30;
const MAX_SCAN_INTERVAL_SECS: u64 = 3600;
/// 히스토리 보관 범위 (항목 수)
const MIN_HISTORY_SIZE: usize = 30;
const MAX_HISTORY_SIZE: usize = 50;

/// Ironwave 통합 설정
///
/// `ironwave.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 모듈은 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IronwaveConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 신호 수집 설정
    #[serde(default)]
    pub scan: ScanConfig,
    /// HTTP API 설정
    #[serde(default)]
    pub api: ApiConfig,
    /// Prometheus 메트릭 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl IronwaveConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    /// 3. 유효성 검증
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, IronwaveError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 파일이 있으면 [`load`](Self::load)와 같고, 없으면 기본값에서 시작합니다.
    ///
    /// 파일이 존재하지만 파싱에 실패하면 에러를 반환합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, IronwaveError> {
        let path = path.as_ref();
        match Self::load(path).await {
            Err(IronwaveError::Config(ConfigError::FileNotFound { .. })) => {
                debug!(path = %path.display(), "config file not found, using defaults");
                let mut config = Self::default();
                config.apply_env_overrides();
                config.validate()?;
                Ok(config)
            }
            other => other,
        }
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, IronwaveError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                IronwaveError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                IronwaveError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, IronwaveError> {
        toml::from_str(toml_str).map_err(|e| {
            IronwaveError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `IRONWAVE_{SECTION}_{FIELD}`
    /// 예: `IRONWAVE_SCAN_INTERFACE=wlan1`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "IRONWAVE_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "IRONWAVE_GENERAL_LOG_FORMAT");
        override_string(&mut self.general.pid_file, "IRONWAVE_GENERAL_PID_FILE");

        // Scan
        override_string(&mut self.scan.interface, "IRONWAVE_SCAN_INTERFACE");
        override_csv(&mut self.scan.capabilities, "IRONWAVE_SCAN_CAPABILITIES");
        override_parsed(
            &mut self.scan.probe_timeout_secs,
            "IRONWAVE_SCAN_PROBE_TIMEOUT_SECS",
        );
        override_parsed(
            &mut self.scan.scan_interval_secs,
            "IRONWAVE_SCAN_SCAN_INTERVAL_SECS",
        );
        override_parsed(&mut self.scan.history_size, "IRONWAVE_SCAN_HISTORY_SIZE");
        override_parsed(
            &mut self.scan.reprobe_after_empty_cycles,
            "IRONWAVE_SCAN_REPROBE_AFTER_EMPTY_CYCLES",
        );
        override_parsed(
            &mut self.scan.allow_demo_fallback,
            "IRONWAVE_SCAN_ALLOW_DEMO_FALLBACK",
        );

        // API
        override_parsed(&mut self.api.enabled, "IRONWAVE_API_ENABLED");
        override_string(&mut self.api.listen_addr, "IRONWAVE_API_LISTEN_ADDR");
        override_parsed(&mut self.api.port, "IRONWAVE_API_PORT");

        // Metrics
        override_parsed(&mut self.metrics.enabled, "IRONWAVE_METRICS_ENABLED");
        override_string(&mut self.metrics.listen_addr, "IRONWAVE_METRICS_LISTEN_ADDR");
        override_parsed(&mut self.metrics.port, "IRONWAVE_METRICS_PORT");
        override_string(&mut self.metrics.endpoint, "IRONWAVE_METRICS_ENDPOINT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), IronwaveError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        // 인터페이스 이름은 외부 명령 인자로 전달되므로 문자 집합을 제한
        let interface = &self.scan.interface;
        if interface.is_empty() || interface.len() > MAX_INTERFACE_LEN {
            return Err(invalid(
                "scan.interface",
                format!("must be 1-{MAX_INTERFACE_LEN} characters"),
            ));
        }
        if !interface
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(invalid(
                "scan.interface",
                "may only contain ASCII letters, digits, '-', '_' and '.'".to_owned(),
            ));
        }

        for name in &self.scan.capabilities {
            if !KNOWN_CAPABILITIES.contains(&name.as_str()) {
                return Err(invalid(
                    "scan.capabilities",
                    format!(
                        "unknown capability '{name}', expected one of: {}",
                        KNOWN_CAPABILITIES.join(", ")
                    ),
                ));
            }
        }

        if self.scan.probe_timeout_secs == 0
            || self.scan.probe_timeout_secs > MAX_PROBE_TIMEOUT_SECS
        {
            return Err(invalid(
                "scan.probe_timeout_secs",
                format!("must be 1-{MAX_PROBE_TIMEOUT_SECS}"),
            ));
        }

        if self.scan.scan_interval_secs > MAX_SCAN_INTERVAL_SECS {
            return Err(invalid(
                "scan.scan_interval_secs",
                format!("must be 0 (per-capability default) or 1-{MAX_SCAN_INTERVAL_SECS}"),
            ));
        }

        if !(MIN_HISTORY_SIZE..=MAX_HISTORY_SIZE).contains(&self.scan.history_size) {
            return Err(invalid(
                "scan.history_size",
                format!("must be {MIN_HISTORY_SIZE}-{MAX_HISTORY_SIZE}"),
            ));
        }

        if self.api.enabled && self.api.port == 0 {
            return Err(invalid("api.port", "must not be 0 when api is enabled".to_owned()));
        }

        if self.metrics.enabled {
            if self.metrics.port == 0 {
                return Err(invalid(
                    "metrics.port",
                    "must not be 0 when metrics is enabled".to_owned(),
                ));
            }
            if self.api.enabled
                && self.api.port == self.metrics.port
                && self.api.listen_addr == self.metrics.listen_addr
            {
                return Err(invalid(
                    "metrics.port",
                    format!("conflicts with api.port {}", self.api.port),
                ));
            }
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: String) -> IronwaveError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    /// PID 파일 경로 (빈 문자열이면 사용하지 않음)
    pub pid_file: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
            pid_file: String::new(),
        }
    }
}

/// 신호 수집 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// 스캔할 무선 인터페이스
    pub interface: String,
    /// 탐지 대상 수집 방식 (탐지 순서는 고정, 목록에 없는 방식은 건너뜀)
    pub capabilities: Vec<String>,
    /// 탐지 명령 타임아웃 (초)
    pub probe_timeout_secs: u64,
    /// 스캔 간격 (초). 0이면 수집 방식별 기본값
    pub scan_interval_secs: u64,
    /// 히스토리 최대 항목 수
    pub history_size: usize,
    /// 연속 빈 스캔이 이 횟수에 도달하면 재탐지 (0이면 비활성화)
    pub reprobe_after_empty_cycles: u32,
    /// 사용 가능한 방식이 없을 때 데모 데이터로 폴백할지 여부
    pub allow_demo_fallback: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            interface: "wlan0".to_owned(),
            capabilities: KNOWN_CAPABILITIES.iter().map(|s| (*s).to_owned()).collect(),
            probe_timeout_secs: 2,
            scan_interval_secs: 0,
            history_size: 30,
            reprobe_after_empty_cycles: 3,
            allow_demo_fallback: true,
        }
    }
}

/// HTTP API 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 바인드 주소
    pub listen_addr: String,
    /// 포트
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            listen_addr: "0.0.0.0".to_owned(),
            port: 8080,
        }
    }
}

/// Prometheus 메트릭 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 바인드 주소
    pub listen_addr: String,
    /// 포트
    pub port: u16,
    /// 스크레이프 경로
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9100,
            endpoint: "/metrics".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

/// 파싱 가능한 값만 반영합니다. 파싱에 실패하면 기존 값을 유지합니다.
fn override_parsed<T: FromStr>(target: &mut T, env_key: &str) {
    let Ok(raw) = std::env::var(env_key) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => *target = value,
        Err(_) => warn!(
            env_key,
            value = raw.as_str(),
            expected = std::any::type_name::<T>(),
            "ignoring env override that does not parse"
        ),
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}
