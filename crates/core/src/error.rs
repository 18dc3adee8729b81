//! 에러 타입 -- 도메인별 에러 정의

/// Ironwave 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum IronwaveError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 파이프라인 생명주기 에러
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// 신호 수집 에러
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 파이프라인 생명주기 에러
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// 파이프라인 초기화 실패
    #[error("pipeline init failed: {0}")]
    InitFailed(String),

    /// 이미 실행 중
    #[error("pipeline is already running")]
    AlreadyRunning,

    /// 실행 중이 아님
    #[error("pipeline is not running")]
    NotRunning,
}

/// 신호 수집 에러
///
/// 스캐너 크레이트의 세부 에러가 데몬 경계를 넘을 때 이 형태로 변환됩니다.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// 사용 가능한 수집 방식이 없음 (데모 폴백 비활성화 상태)
    #[error("no usable scan capability found")]
    NoCapability,

    /// 외부 명령 실행 실패
    #[error("command failed: {0}")]
    CommandFailed(String),

    /// 외부 명령 시간 초과
    #[error("command timed out after {secs}s: {command}")]
    Timeout { command: String, secs: u64 },

    /// 출력 파싱 실패
    #[error("parse failed: {0}")]
    ParseFailed(String),
}
