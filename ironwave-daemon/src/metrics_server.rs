//! Prometheus 스크레이프 엔드포인트
//!
//! `metrics-exporter-prometheus`의 내장 HTTP 리스너를 사용합니다.
//! 설치 이후의 모든 `metrics::counter!` / `gauge!` / `histogram!` 호출이 기록됩니다.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use ironwave_core::config::MetricsConfig;
use ironwave_core::metrics as m;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};

/// 내장 리스너가 제공하는 유일한 경로
const SCRAPE_PATH: &str = "/metrics";

/// 전역 recorder를 설치하고 스크레이프 리스너를 엽니다.
///
/// 프로세스당 한 번만 호출할 수 있습니다. 두 번째 호출은 에러입니다.
pub fn install_metrics_recorder(config: &MetricsConfig) -> Result<()> {
    let addr = scrape_addr(config)?;
    if addr.ip().is_unspecified() {
        tracing::warn!(
            listen_addr = %addr,
            "metrics listener accepts connections on every interface"
        );
    }

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets_for_metric(
            Matcher::Full(m::SCANNER_CYCLE_DURATION_SECONDS.to_owned()),
            &m::CYCLE_DURATION_BUCKETS,
        )
        .context("invalid cycle duration buckets")?
        .install()
        .with_context(|| format!("failed to install metrics recorder on {addr}"))?;

    m::describe_all();
    tracing::info!(listen_addr = %addr, path = SCRAPE_PATH, "prometheus exporter listening");
    Ok(())
}

/// 설정에서 리스너 주소를 만듭니다.
fn scrape_addr(config: &MetricsConfig) -> Result<SocketAddr> {
    if config.endpoint != SCRAPE_PATH {
        anyhow::bail!(
            "metrics.endpoint '{}' is not served; the exporter only answers on '{}'",
            config.endpoint,
            SCRAPE_PATH
        );
    }
    format!("{}:{}", config.listen_addr, config.port)
        .parse()
        .with_context(|| {
            format!(
                "metrics.listen_addr '{}' with port {} is not a socket address",
                config.listen_addr, config.port
            )
        })
}
