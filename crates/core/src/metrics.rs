//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `ironwave_`
//! - 모듈명: `scanner_`, `api_`, `daemon_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(ironwave_core::metrics::SCANNER_CYCLES_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 수집 방식 레이블 키 (iw, wpa_cli, termux, dumpsys, proc, demo)
pub const LABEL_METHOD: &str = "method";

/// 결과 레이블 키 (success, empty, failure)
pub const LABEL_RESULT: &str = "result";

/// HTTP 경로 레이블 키
pub const LABEL_ROUTE: &str = "route";

// ─── Scanner 메트릭 ────────────────────────────────────────────────

/// Scanner: 실행된 스캔 사이클 수 (counter, labels: method, result)
pub const SCANNER_CYCLES_TOTAL: &str = "ironwave_scanner_cycles_total";

/// Scanner: 사이클 소요 시간 (histogram, 초)
pub const SCANNER_CYCLE_DURATION_SECONDS: &str = "ironwave_scanner_cycle_duration_seconds";

/// Scanner: 최신 스냅샷의 신호 수 (gauge)
pub const SCANNER_SIGNALS_OBSERVED: &str = "ironwave_scanner_signals_observed";

/// Scanner: 최신 스냅샷의 고위험 신호 수 (gauge)
pub const SCANNER_HIGH_RISK_SIGNALS: &str = "ironwave_scanner_high_risk_signals";

/// Scanner: 수행된 탐지(probe) 횟수 (counter, label: method)
pub const SCANNER_PROBES_TOTAL: &str = "ironwave_scanner_probes_total";

/// Scanner: 외부 명령 타임아웃 수 (counter)
pub const SCANNER_COMMAND_TIMEOUTS_TOTAL: &str = "ironwave_scanner_command_timeouts_total";

// ─── API 메트릭 ─────────────────────────────────────────────────────

/// API: 처리된 요청 수 (counter, label: route)
pub const API_REQUESTS_TOTAL: &str = "ironwave_api_requests_total";

// ─── Daemon 메트릭 ──────────────────────────────────────────────────

/// Daemon: 가동 시간 (gauge, 초)
pub const DAEMON_UPTIME_SECONDS: &str = "ironwave_daemon_uptime_seconds";

/// Daemon: 빌드 정보 (gauge, 항상 1, label: version)
pub const DAEMON_BUILD_INFO: &str = "ironwave_daemon_build_info";

// ─── 히스토그램 버킷 정의 ────────────────────────────────────────────

/// 스캔 사이클 소요 시간 히스토그램 버킷 (초)
///
/// 데모는 수 밀리초, `iw` 물리 스캔은 수 초가 걸립니다.
pub const CYCLE_DURATION_BUCKETS: [f64; 9] = [0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 8.0, 15.0];

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
/// 일반적으로 `ironwave-daemon`의 시작 시점에서 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    // Scanner
    describe_counter!(
        SCANNER_CYCLES_TOTAL,
        "Total number of acquisition cycles by method and result"
    );
    describe_histogram!(
        SCANNER_CYCLE_DURATION_SECONDS,
        "Time to run one acquisition cycle (command, parse, enrich, publish) in seconds"
    );
    describe_gauge!(
        SCANNER_SIGNALS_OBSERVED,
        "Number of signals in the latest published snapshot"
    );
    describe_gauge!(
        SCANNER_HIGH_RISK_SIGNALS,
        "Number of high-risk signals in the latest published snapshot"
    );
    describe_counter!(
        SCANNER_PROBES_TOTAL,
        "Total number of capability probes by selected method"
    );
    describe_counter!(
        SCANNER_COMMAND_TIMEOUTS_TOTAL,
        "Total number of external scan commands that hit their timeout"
    );

    // API
    describe_counter!(API_REQUESTS_TOTAL, "Total number of HTTP API requests by route");

    // Daemon
    describe_gauge!(DAEMON_UPTIME_SECONDS, "Ironwave daemon uptime in seconds");
    describe_gauge!(
        DAEMON_BUILD_INFO,
        "Build information (always 1, with version label)"
    );
}
