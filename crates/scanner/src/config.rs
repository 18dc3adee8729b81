//! 스캐너 설정
//!
//! [`ScannerConfig`]는 core의 [`ScanConfig`]를 타입이 있는 형태로 변환한 것입니다.
//! 수집 방식 이름은 [`CapabilityKind`]로, 초 단위 값은 [`Duration`]으로 바뀝니다.
//!
//! # 사용 예시
//!
//! ```
//! use ironwave_scanner::ScannerConfig;
//!
//! let config = ScannerConfig::default();
//! config.validate().unwrap();
//! ```

use std::time::Duration;

use ironwave_core::config::ScanConfig;
use tracing::warn;

use crate::capability::CapabilityKind;
use crate::enrich::RiskPolicy;
use crate::error::ScannerError;

/// 설정 상한값 상수
const MAX_PROBE_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_SCAN_INTERVAL: Duration = Duration::from_secs(3600);
const MAX_HISTORY_SIZE: usize = 50;
const MAX_INTERFACE_LEN: usize = 15;

/// 스캐너 설정
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// 무선 인터페이스 이름
    pub interface: String,
    /// 탐지 허용 목록
    pub capabilities: Vec<CapabilityKind>,
    /// 탐지 명령 타임아웃
    pub probe_timeout: Duration,
    /// 스캔 간격. `None`이면 수집 방식별 기본값
    pub scan_interval: Option<Duration>,
    /// 히스토리 링 버퍼 크기
    pub history_size: usize,
    /// 연속 빈 사이클 N회 후 재탐지 (0이면 비활성화)
    pub reprobe_after_empty_cycles: u32,
    /// 탐지 실패 시 데모 데이터 사용 여부
    pub allow_demo_fallback: bool,
    /// 위험도 가중치
    pub risk_policy: RiskPolicy,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            interface: "wlan0".to_owned(),
            capabilities: CapabilityKind::PROBE_ORDER.to_vec(),
            probe_timeout: Duration::from_secs(2),
            scan_interval: None,
            history_size: 30,
            reprobe_after_empty_cycles: 3,
            allow_demo_fallback: true,
            risk_policy: RiskPolicy::default(),
        }
    }
}

impl ScannerConfig {
    /// core의 `ScanConfig`에서 스캐너 설정을 생성합니다.
    ///
    /// 알 수 없는 수집 방식 이름은 경고 후 무시합니다 (core 검증을 통과했다면 발생하지 않음).
    pub fn from_core(core: &ScanConfig) -> Self {
        let capabilities = core
            .capabilities
            .iter()
            .filter_map(|name| {
                let kind = CapabilityKind::from_name(name);
                if kind.is_none() {
                    warn!(capability = %name, "ignoring unknown capability name");
                }
                kind
            })
            .filter(|kind| *kind != CapabilityKind::Demo)
            .collect();

        Self {
            interface: core.interface.clone(),
            capabilities,
            probe_timeout: Duration::from_secs(core.probe_timeout_secs),
            scan_interval: (core.scan_interval_secs > 0)
                .then(|| Duration::from_secs(core.scan_interval_secs)),
            history_size: core.history_size,
            reprobe_after_empty_cycles: core.reprobe_after_empty_cycles,
            allow_demo_fallback: core.allow_demo_fallback,
            ..Self::default()
        }
    }

    /// 수집 방식의 실제 스캔 간격
    pub fn interval_for(&self, kind: CapabilityKind) -> Duration {
        self.scan_interval.unwrap_or_else(|| kind.default_interval())
    }

    /// 설정 값의 유효성을 검증합니다.
    ///
    /// # 검증 규칙
    ///
    /// - `interface`: 1-15자, 영숫자와 `-_.`만 허용 (명령 인자로 전달됨)
    /// - `probe_timeout`: 1-30초
    /// - `scan_interval`: 1-3600초
    /// - `history_size`: 1-50
    pub fn validate(&self) -> Result<(), ScannerError> {
        let iface_ok = !self.interface.is_empty()
            && self.interface.len() <= MAX_INTERFACE_LEN
            && self
                .interface
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !iface_ok {
            return Err(ScannerError::Config {
                field: "interface".to_owned(),
                reason: format!(
                    "must be 1-{MAX_INTERFACE_LEN} characters of [A-Za-z0-9-_.], got '{}'",
                    self.interface
                ),
            });
        }

        if self.probe_timeout.is_zero() || self.probe_timeout > MAX_PROBE_TIMEOUT {
            return Err(ScannerError::Config {
                field: "probe_timeout".to_owned(),
                reason: format!("must be 1-{}s", MAX_PROBE_TIMEOUT.as_secs()),
            });
        }

        if let Some(interval) = self.scan_interval {
            if interval.is_zero() || interval > MAX_SCAN_INTERVAL {
                return Err(ScannerError::Config {
                    field: "scan_interval".to_owned(),
                    reason: format!("must be 1-{}s", MAX_SCAN_INTERVAL.as_secs()),
                });
            }
        }

        if self.history_size == 0 || self.history_size > MAX_HISTORY_SIZE {
            return Err(ScannerError::Config {
                field: "history_size".to_owned(),
                reason: format!("must be 1-{MAX_HISTORY_SIZE}"),
            });
        }

        Ok(())
    }
}
