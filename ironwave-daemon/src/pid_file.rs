//! PID 파일 관리
//!
//! 같은 설정으로 데몬이 두 번 뜨는 것을 막습니다.
//!
//! # Security
//!
//! - `create_new(true)`로 원자적으로 생성 (TOCTOU 경쟁 방지)
//! - 생성된 파일이 일반 파일인지 확인 (심볼릭 링크 공격 방지)
//! - 상위 디렉토리는 0o700, 파일은 0o600

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use anyhow::Result;

/// 현재 프로세스 PID를 파일에 기록합니다.
///
/// # Errors
///
/// - 파일이 이미 존재 (다른 인스턴스가 실행 중일 수 있음)
/// - 상위 디렉토리 생성 또는 쓰기 실패
pub fn write_pid_file(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_private_dir(parent)?;
    }

    let pid = std::process::id();

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            let existing = fs::read_to_string(path).unwrap_or_else(|_| "unknown".to_owned());
            return Err(anyhow::anyhow!(
                "PID file {} already exists with PID: {}. Is another instance running?",
                path.display(),
                existing.trim()
            ));
        }
        Err(e) => {
            return Err(anyhow::anyhow!(
                "failed to create PID file {}: {}",
                path.display(),
                e
            ));
        }
    };

    if !file.metadata()?.is_file() {
        let _ = fs::remove_file(path);
        return Err(anyhow::anyhow!(
            "PID file {} is not a regular file (possible symlink attack)",
            path.display()
        ));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }

    writeln!(file, "{pid}")?;

    tracing::info!(pid, path = %path.display(), "PID file written");
    Ok(())
}

/// PID 파일을 삭제합니다. 실패해도 경고만 남깁니다.
pub fn remove_pid_file(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => tracing::info!(path = %path.display(), "PID file removed"),
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to remove PID file"),
    }
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new()
        .mode(0o700)
        .recursive(true)
        .create(dir)?;
    Ok(())
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_current_pid_and_creates_parent() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("run").join("ironwave.pid");

        write_pid_file(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim().parse::<u32>().unwrap(), std::process::id());
    }

    #[test]
    fn refuses_existing_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("ironwave.pid");
        fs::write(&path, "12345").unwrap();

        let err = write_pid_file(&path).unwrap_err().to_string();
        assert!(err.contains("already exists"), "got: {err}");
        assert!(err.contains("12345"), "got: {err}");
    }

    #[cfg(unix)]
    #[test]
    fn file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("ironwave.pid");
        write_pid_file(&path).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn remove_missing_file_does_not_panic() {
        let temp = tempfile::TempDir::new().unwrap();
        remove_pid_file(&temp.path().join("missing.pid"));
    }
}
