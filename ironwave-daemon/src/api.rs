//! HTTP 조회 API
//!
//! 수집 루프가 발행한 최신 스냅샷을 폴링 클라이언트에 제공합니다.
//! 핸들러는 [`StateStore`]에서 `Arc`를 복제할 뿐이며 외부 프로세스를
//! 실행하거나 스캔을 기다리지 않습니다.
//!
//! # Endpoints
//! - `GET /api/scan` - `{ signals, method, last_scan }`
//! - `GET /api/history` - `{ entries }` (최신 항목이 먼저)
//! - `GET /health` - 데몬 헬스 (Unhealthy이면 503)

use std::net::SocketAddr;
use std::time::Instant;

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, watch};

use ironwave_core::config::ApiConfig;
use ironwave_core::metrics as m;
use ironwave_core::types::{HistoryEntry, Signal, Snapshot};
use ironwave_scanner::StateStore;

use crate::health::DaemonHealth;

/// 핸들러 공유 상태
#[derive(Clone)]
pub struct ApiState {
    store: StateStore,
    health: watch::Receiver<DaemonHealth>,
    started: Instant,
}

impl ApiState {
    /// 새 API 상태를 생성합니다.
    pub fn new(store: StateStore, health: watch::Receiver<DaemonHealth>) -> Self {
        Self {
            store,
            health,
            started: Instant::now(),
        }
    }
}

/// `GET /api/scan` 응답
#[derive(Debug, Clone, Serialize)]
pub struct ScanResponse {
    /// 세기 내림차순 신호 목록
    pub signals: Vec<Signal>,
    /// 수집 방식 이름
    pub method: String,
    /// 마지막 스캔 시각 (첫 스캔 전에는 `null`)
    pub last_scan: Option<DateTime<Utc>>,
}

impl From<&Snapshot> for ScanResponse {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            signals: snapshot.signals.clone(),
            method: snapshot.method.clone(),
            last_scan: snapshot.scanned_at,
        }
    }
}

/// `GET /api/history` 응답
#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    /// 최신 항목이 먼저
    pub entries: Vec<HistoryEntry>,
}

/// API 라우터를 생성합니다.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/scan", get(scan))
        .route("/api/history", get(history))
        .route("/health", get(health))
        .with_state(state)
}

async fn scan(State(state): State<ApiState>) -> Json<ScanResponse> {
    metrics::counter!(m::API_REQUESTS_TOTAL, m::LABEL_ROUTE => "/api/scan").increment(1);
    let snapshot = state.store.current_snapshot();
    Json(ScanResponse::from(snapshot.as_ref()))
}

async fn history(State(state): State<ApiState>) -> Json<HistoryResponse> {
    metrics::counter!(m::API_REQUESTS_TOTAL, m::LABEL_ROUTE => "/api/history").increment(1);
    Json(HistoryResponse {
        entries: state.store.history(),
    })
}

async fn health(State(state): State<ApiState>) -> Response {
    metrics::counter!(m::API_REQUESTS_TOTAL, m::LABEL_ROUTE => "/health").increment(1);
    let mut report = state.health.borrow().clone();
    report.uptime_secs = state.started.elapsed().as_secs();

    let code = if report.status.is_unhealthy() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    (code, Json(report)).into_response()
}

/// API 설정의 주소로 리스너를 바인드합니다.
///
/// 바인드 실패는 시작 시점의 치명적 에러입니다.
pub async fn bind(config: &ApiConfig) -> Result<TcpListener> {
    let addr: SocketAddr = format!("{}:{}", config.listen_addr, config.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid api listen address: {}", e))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind api listener on {}: {}", addr, e))?;

    tracing::info!(listen_addr = %addr, "api listener bound");
    Ok(listener)
}

/// 종료 신호를 받을 때까지 API를 서비스하는 태스크를 스폰합니다.
pub fn spawn_server(
    listener: TcpListener,
    app: Router,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<Result<()>> {
    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                tracing::debug!("api server shutting down");
            })
            .await
            .map_err(|e| anyhow::anyhow!("api server failed: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_response_keeps_empty_snapshot_shape() {
        let response = ScanResponse::from(&Snapshot::empty());
        let json = serde_json::to_value(&response).unwrap();
        assert!(json["signals"].as_array().unwrap().is_empty());
        assert!(json["last_scan"].is_null());
        assert!(json["method"].is_string());
    }

    #[tokio::test]
    async fn bind_rejects_invalid_address() {
        let config = ApiConfig {
            enabled: true,
            listen_addr: "not-an-ip".to_owned(),
            port: 8080,
        };
        assert!(bind(&config).await.is_err());
    }
}
