//! Aggregated health reporting.
//!
//! The orchestrator polls the scanner's `health_check()` and the API server
//! task, folds them into one [`DaemonHealth`] and publishes it on a
//! `tokio::sync::watch` channel. The `/health` handler reads the latest value.
//!
//! # Aggregation Rule
//!
//! - All Healthy -> Healthy
//! - Any Degraded, none Unhealthy -> Degraded(reason)
//! - Any Unhealthy -> Unhealthy(reason)

use serde::Serialize;

use ironwave_core::pipeline::HealthStatus;

/// 스캐너 모듈 이름
pub const SCANNER_MODULE: &str = "scanner";

/// HTTP API 모듈 이름
pub const API_MODULE: &str = "api";

/// Aggregated health report for the entire daemon.
#[derive(Debug, Clone, Serialize)]
pub struct DaemonHealth {
    /// Overall daemon health status (worst of all enabled modules).
    pub status: HealthStatus,
    /// Daemon uptime in seconds since start.
    pub uptime_secs: u64,
    /// 현재 수집 방식 (탐지 전에는 `None`)
    pub method: Option<String>,
    /// Per-module health reports.
    pub modules: Vec<ModuleHealth>,
}

impl DaemonHealth {
    /// 모듈 상태로부터 보고서를 만듭니다.
    pub fn from_modules(modules: Vec<ModuleHealth>, method: Option<String>, uptime_secs: u64) -> Self {
        Self {
            status: aggregate_status(&modules),
            uptime_secs,
            method,
            modules,
        }
    }

    /// 첫 헬스 체크 전의 초기 상태
    pub fn starting() -> Self {
        Self {
            status: HealthStatus::Degraded("starting".to_owned()),
            uptime_secs: 0,
            method: None,
            modules: Vec::new(),
        }
    }
}

/// Health status for a single module.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleHealth {
    /// Module name (`scanner`, `api`).
    pub name: String,
    /// Whether the module is enabled in configuration.
    pub enabled: bool,
    /// Current health status of the module.
    pub status: HealthStatus,
}

impl ModuleHealth {
    /// 활성화된 모듈의 상태
    pub fn enabled(name: &str, status: HealthStatus) -> Self {
        Self {
            name: name.to_owned(),
            enabled: true,
            status,
        }
    }

    /// 설정으로 비활성화된 모듈
    pub fn disabled(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            enabled: false,
            status: HealthStatus::Healthy,
        }
    }
}

/// Aggregate module statuses into a single status.
///
/// Returns the worst status found: Unhealthy > Degraded > Healthy.
/// Reasons of every non-healthy module at the worst level are joined with `; `.
/// Disabled modules are ignored.
pub fn aggregate_status(modules: &[ModuleHealth]) -> HealthStatus {
    let mut degraded = Vec::new();
    let mut unhealthy = Vec::new();

    for module in modules.iter().filter(|m| m.enabled) {
        match &module.status {
            HealthStatus::Healthy => {}
            HealthStatus::Degraded(reason) => degraded.push(format!("{}: {}", module.name, reason)),
            HealthStatus::Unhealthy(reason) => {
                unhealthy.push(format!("{}: {}", module.name, reason));
            }
        }
    }

    if !unhealthy.is_empty() {
        HealthStatus::Unhealthy(unhealthy.join("; "))
    } else if !degraded.is_empty() {
        HealthStatus::Degraded(degraded.join("; "))
    } else {
        HealthStatus::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_modules_aggregates() {
        let report = DaemonHealth::from_modules(
            vec![
                ModuleHealth::enabled(SCANNER_MODULE, HealthStatus::Degraded("demo".to_owned())),
                ModuleHealth::enabled(API_MODULE, HealthStatus::Healthy),
            ],
            Some("demo".to_owned()),
            12,
        );
        assert_eq!(report.status, HealthStatus::Degraded("scanner: demo".to_owned()));
        assert_eq!(report.uptime_secs, 12);
    }

    #[test]
    fn starting_is_degraded() {
        assert!(matches!(
            DaemonHealth::starting().status,
            HealthStatus::Degraded(_)
        ));
    }

    #[test]
    fn serializes_nested_status() {
        let report = DaemonHealth::from_modules(
            vec![ModuleHealth::enabled(SCANNER_MODULE, HealthStatus::Healthy)],
            Some("iw".to_owned()),
            1,
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"]["status"], "healthy");
        assert_eq!(json["method"], "iw");
        assert_eq!(json["modules"][0]["name"], "scanner");
    }
}
