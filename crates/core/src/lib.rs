//! Ironwave 공통 크레이트
//!
//! 스캐너, 데몬, CLI가 공유하는 도메인 타입, 에러, 설정,
//! 파이프라인 생명주기 trait과 메트릭 이름을 제공합니다.

pub mod config;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod types;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{ConfigError, IronwaveError, PipelineError, ScanError};

// 설정
pub use config::IronwaveConfig;

// 파이프라인 trait
pub use pipeline::{HealthStatus, Pipeline};

// 도메인 타입
pub use types::{
    EncryptionClass, HistoryEntry, Position, RiskBand, Signal, SignalKind, Snapshot,
};
