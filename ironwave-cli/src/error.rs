//! CLI 에러와 종료 코드

use ironwave_core::error::IronwaveError;
use ironwave_scanner::ScannerError;

/// 서브커맨드 실행 중 발생하는 에러
///
/// `main`은 메시지를 stderr에 쓰고 [`CliError::exit_code`]로 종료합니다.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// 설정 파일이 없거나 유효하지 않음
    #[error("configuration error: {0}")]
    Config(String),

    /// 잘못된 인자 등 서브커맨드 자체의 실패
    #[error("{0}")]
    Command(String),

    /// JSON 출력 직렬화 실패
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// 캡처 파일 읽기, stdout 쓰기 실패
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from ironwave-core.
    #[error("{0}")]
    Core(#[from] IronwaveError),

    /// Acquisition or parsing failure.
    #[error("scan error: {0}")]
    Scanner(#[from] ScannerError),
}

impl CliError {
    /// 프로세스 종료 코드
    ///
    /// | Code | Meaning                                 |
    /// |------|-----------------------------------------|
    /// | 0    | Success                                 |
    /// | 1    | General / command error                 |
    /// | 2    | Configuration error                     |
    /// | 4    | No usable capability or unparsable data |
    /// | 10   | IO error                                |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(IronwaveError::Config(_)) => 2,
            Self::Scanner(ScannerError::Config { .. }) => 2,
            Self::Scanner(_) | Self::Core(IronwaveError::Scan(_)) => 4,
            Self::Io(_) | Self::Core(IronwaveError::Io(_)) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironwave_core::error::{ConfigError, ScanError};

    #[test]
    fn test_exit_code_config_error() {
        let err = CliError::Config("bad".to_owned());
        assert_eq!(err.exit_code(), 2, "config error should return exit code 2");
    }

    #[test]
    fn test_exit_code_core_config_error() {
        let err = CliError::from(IronwaveError::Config(ConfigError::ParseFailed {
            reason: "expected `]`".to_owned(),
        }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_scanner_config_error() {
        let err = CliError::from(ScannerError::Config {
            field: "interface".to_owned(),
            reason: "must not be empty".to_owned(),
        });
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_no_capability() {
        let err = CliError::from(ScannerError::NoCapability);
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().starts_with("scan error:"));
    }

    #[test]
    fn test_exit_code_core_scan_error() {
        let err = CliError::from(IronwaveError::Scan(ScanError::NoCapability));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_exit_code_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = CliError::from(io_err);
        assert_eq!(err.exit_code(), 10, "io error should return exit code 10");
    }

    #[test]
    fn test_exit_code_command_error() {
        let err = CliError::Command("unknown section: foo".to_owned());
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_string(), "unknown section: foo");
    }

    #[test]
    fn test_exit_code_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = CliError::from(json_err);
        assert_eq!(err.exit_code(), 1);
    }
}
