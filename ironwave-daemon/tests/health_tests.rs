//! Health aggregation tests.
//!
//! Tests the health status aggregation logic and module health reporting.

use ironwave_core::pipeline::HealthStatus;
use ironwave_daemon::health::{API_MODULE, ModuleHealth, SCANNER_MODULE, aggregate_status};

#[test]
fn test_aggregate_status_all_healthy() {
    // Given: All modules are healthy
    let modules = vec![
        ModuleHealth::enabled(SCANNER_MODULE, HealthStatus::Healthy),
        ModuleHealth::enabled(API_MODULE, HealthStatus::Healthy),
    ];

    // Then: Overall status should be Healthy
    assert!(aggregate_status(&modules).is_healthy());
}

#[test]
fn test_aggregate_status_demo_mode_is_degraded() {
    // Given: The scanner fell back to demo data
    let modules = vec![
        ModuleHealth::enabled(
            SCANNER_MODULE,
            HealthStatus::Degraded("serving demo data".to_owned()),
        ),
        ModuleHealth::enabled(API_MODULE, HealthStatus::Healthy),
    ];

    // Then: Degraded, with the module name and reason
    match aggregate_status(&modules) {
        HealthStatus::Degraded(reason) => {
            assert!(reason.contains("scanner"), "reason: {reason}");
            assert!(reason.contains("serving demo data"), "reason: {reason}");
        }
        other => panic!("expected Degraded, got: {other:?}"),
    }
}

#[test]
fn test_aggregate_status_unhealthy_wins_over_degraded() {
    let modules = vec![
        ModuleHealth::enabled(SCANNER_MODULE, HealthStatus::Degraded("re-probing".to_owned())),
        ModuleHealth::enabled(API_MODULE, HealthStatus::Unhealthy("api server exited".to_owned())),
    ];

    match aggregate_status(&modules) {
        HealthStatus::Unhealthy(reason) => {
            assert!(reason.contains("api: api server exited"), "reason: {reason}");
            assert!(!reason.contains("re-probing"), "reason: {reason}");
        }
        other => panic!("expected Unhealthy, got: {other:?}"),
    }
}

#[test]
fn test_aggregate_status_joins_multiple_reasons() {
    let modules = vec![
        ModuleHealth::enabled(SCANNER_MODULE, HealthStatus::Unhealthy("stopped".to_owned())),
        ModuleHealth::enabled(API_MODULE, HealthStatus::Unhealthy("not started".to_owned())),
    ];

    assert_eq!(
        aggregate_status(&modules),
        HealthStatus::Unhealthy("scanner: stopped; api: not started".to_owned())
    );
}

#[test]
fn test_aggregate_status_ignores_disabled_modules() {
    // Given: The API is disabled in config
    let mut api = ModuleHealth::disabled(API_MODULE);
    api.status = HealthStatus::Unhealthy("would be ignored".to_owned());
    let modules = vec![
        ModuleHealth::enabled(SCANNER_MODULE, HealthStatus::Healthy),
        api,
    ];

    assert!(aggregate_status(&modules).is_healthy());
}

#[test]
fn test_aggregate_status_empty_is_healthy() {
    assert!(aggregate_status(&[]).is_healthy());
}
