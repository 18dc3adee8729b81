//! 파이프라인 trait -- 모듈 생명주기 정의
//!
//! 데몬은 [`Pipeline`]을 구현한 모듈을 시작/정지하고
//! [`HealthStatus`]로 상태를 집계합니다.

use std::fmt;
use std::future::Future;

use serde::Serialize;

use crate::error::IronwaveError;

/// 모듈 헬스 상태
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum HealthStatus {
    /// 정상
    Healthy,
    /// 동작 중이지만 기능 저하 (예: 데모 데이터로 폴백)
    Degraded(String),
    /// 동작 불가
    Unhealthy(String),
}

impl HealthStatus {
    /// 정상 상태인지 확인합니다.
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }

    /// 동작 불가 상태인지 확인합니다.
    pub fn is_unhealthy(&self) -> bool {
        matches!(self, Self::Unhealthy(_))
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Degraded(reason) => write!(f, "degraded: {reason}"),
            Self::Unhealthy(reason) => write!(f, "unhealthy: {reason}"),
        }
    }
}

/// 백그라운드 모듈 생명주기 trait
///
/// `start()`는 백그라운드 태스크를 스폰한 뒤 즉시 반환해야 합니다.
/// `stop()`은 스폰한 태스크가 모두 종료될 때까지 기다립니다.
pub trait Pipeline: Send {
    /// 모듈을 시작합니다.
    fn start(&mut self) -> impl Future<Output = Result<(), IronwaveError>> + Send;

    /// 모듈을 정지합니다.
    fn stop(&mut self) -> impl Future<Output = Result<(), IronwaveError>> + Send;

    /// 현재 헬스 상태를 반환합니다.
    fn health_check(&self) -> impl Future<Output = HealthStatus> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_status_predicates() {
        assert!(HealthStatus::Healthy.is_healthy());
        assert!(!HealthStatus::Degraded("demo".to_owned()).is_healthy());
        assert!(!HealthStatus::Degraded("demo".to_owned()).is_unhealthy());
        assert!(HealthStatus::Unhealthy("stopped".to_owned()).is_unhealthy());
    }

    #[test]
    fn health_status_serializes_with_reason() {
        let json = serde_json::to_value(HealthStatus::Degraded("demo mode".to_owned())).unwrap();
        assert_eq!(json["status"], "degraded");
        assert_eq!(json["reason"], "demo mode");

        let json = serde_json::to_value(HealthStatus::Healthy).unwrap();
        assert_eq!(json["status"], "healthy");
    }

    #[test]
    fn health_status_display() {
        assert_eq!(HealthStatus::Healthy.to_string(), "healthy");
        assert_eq!(
            HealthStatus::Unhealthy("not started".to_owned()).to_string(),
            "unhealthy: not started"
        );
    }
}
