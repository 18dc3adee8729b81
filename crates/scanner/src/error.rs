//! 스캐너 에러 타입
//!
//! [`ScannerError`]는 신호 수집 모듈 내에서 발생할 수 있는 모든 에러를 나타냅니다.
//! `From<ScannerError> for IronwaveError` 구현을 통해 `?` 연산자로
//! 상위 에러 타입으로 전파됩니다.
//!
//! # 에러 카테고리
//!
//! - **탐지**: `NoCapability`
//! - **외부 명령**: `CommandNotFound`, `PermissionDenied`, `Spawn`, `Timeout`, `CommandFailed`
//! - **파싱**: `Parse`
//! - **설정**: `Config`
//!
//! 사이클 단위 에러(외부 명령, 파싱)는 수집 루프가 잡아서 빈 스냅샷으로 처리하며,
//! 프로세스를 종료시키는 것은 시작 시점의 `NoCapability`와 `Config`뿐입니다.

use ironwave_core::error::{ConfigError, IronwaveError, ScanError};

/// 스캐너 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ScannerError {
    /// 사용 가능한 수집 방식이 없고 데모 폴백도 비활성화됨
    #[error("no usable scan capability found and demo fallback is disabled")]
    NoCapability,

    /// 실행 파일을 찾을 수 없음
    #[error("command not found: {program}")]
    CommandNotFound {
        /// 실행 파일 이름
        program: String,
    },

    /// 실행 권한 없음
    #[error("permission denied: {program}")]
    PermissionDenied {
        /// 실행 파일 이름
        program: String,
    },

    /// 프로세스 생성/대기 실패
    #[error("failed to run {program}: {reason}")]
    Spawn {
        /// 실행 파일 이름
        program: String,
        /// 실패 사유
        reason: String,
    },

    /// 외부 명령 시간 초과
    #[error("command timed out after {secs}s: {command}")]
    Timeout {
        /// 전체 명령줄
        command: String,
        /// 타임아웃 (초)
        secs: u64,
    },

    /// 외부 명령이 0이 아닌 코드로 종료
    #[error("command exited with {exit_code:?}: {command}: {stderr}")]
    CommandFailed {
        /// 전체 명령줄
        command: String,
        /// 종료 코드 (시그널로 종료되면 `None`)
        exit_code: Option<i32>,
        /// 표준 에러 (앞부분만)
        stderr: String,
    },

    /// 출력 형식이 완전히 어긋나 복구 불가
    #[error("parse error ({format}): {reason}")]
    Parse {
        /// 출력 형식 (수집 방식 이름)
        format: String,
        /// 실패 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },
}

impl ScannerError {
    /// 시간 초과 에러인지 확인합니다.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl From<ScannerError> for IronwaveError {
    fn from(err: ScannerError) -> Self {
        match err {
            ScannerError::NoCapability => IronwaveError::Scan(ScanError::NoCapability),
            ScannerError::Timeout { command, secs } => {
                IronwaveError::Scan(ScanError::Timeout { command, secs })
            }
            ScannerError::Parse { format, reason } => {
                IronwaveError::Scan(ScanError::ParseFailed(format!("{format}: {reason}")))
            }
            ScannerError::Config { field, reason } => {
                IronwaveError::Config(ConfigError::InvalidValue { field, reason })
            }
            other => IronwaveError::Scan(ScanError::CommandFailed(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_error_display() {
        let err = ScannerError::Timeout {
            command: "dumpsys wifi".to_owned(),
            secs: 8,
        };
        assert!(err.is_timeout());
        assert!(err.to_string().contains("dumpsys wifi"));
    }

    #[test]
    fn command_failed_display_includes_exit_code() {
        let err = ScannerError::CommandFailed {
            command: "iw dev wlan0 scan".to_owned(),
            exit_code: Some(240),
            stderr: "command failed: Device or resource busy (-16)".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("240"));
        assert!(msg.contains("resource busy"));
        assert!(!err.is_timeout());
    }

    #[test]
    fn no_capability_converts_to_scan_error() {
        let err: IronwaveError = ScannerError::NoCapability.into();
        assert!(matches!(err, IronwaveError::Scan(ScanError::NoCapability)));
    }

    #[test]
    fn config_error_converts_to_config_error() {
        let err: IronwaveError = ScannerError::Config {
            field: "history_size".to_owned(),
            reason: "must be 1-1000".to_owned(),
        }
        .into();
        assert!(matches!(
            err,
            IronwaveError::Config(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn command_not_found_converts_to_command_failed() {
        let err: IronwaveError = ScannerError::CommandNotFound {
            program: "iw".to_owned(),
        }
        .into();
        match err {
            IronwaveError::Scan(ScanError::CommandFailed(msg)) => assert!(msg.contains("iw")),
            other => panic!("unexpected conversion: {other:?}"),
        }
    }
}
