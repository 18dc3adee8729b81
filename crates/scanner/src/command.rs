//! 외부 명령 실행 추상화
//!
//! [`CommandRunner`] trait으로 외부 명령 실행을 추상화하여
//! 테스트에서 [`ScriptedCommandRunner`]로 교체할 수 있습니다.
//!
//! 모든 실행은 타임아웃을 가지며, 타임아웃 시 자식 프로세스는 종료됩니다.
//! 명령은 항상 인자 벡터로 실행하고 셸을 거치지 않습니다.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::process::Command;
use tracing::debug;

use crate::error::ScannerError;

/// 캡처할 최대 출력 크기 (4 MiB)
const MAX_OUTPUT_BYTES: usize = 4 * 1024 * 1024;

/// 에러 메시지에 포함할 stderr 최대 길이
const MAX_STDERR_IN_ERROR: usize = 256;

/// 외부 명령 실행 결과
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// 종료 코드 (시그널로 종료되면 `None`)
    pub exit_code: Option<i32>,
    /// 표준 출력
    pub stdout: String,
    /// 표준 에러
    pub stderr: String,
}

impl CommandOutput {
    /// 종료 코드 0으로 끝난 출력을 생성합니다.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// 정상 종료 여부
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// 비정상 종료를 에러로 변환합니다.
    pub fn into_result(self, command: &str) -> Result<String, ScannerError> {
        if self.success() {
            return Ok(self.stdout);
        }
        let mut stderr = self.stderr.trim().to_owned();
        if stderr.len() > MAX_STDERR_IN_ERROR {
            let cut = floor_char_boundary(&stderr, MAX_STDERR_IN_ERROR);
            stderr.truncate(cut);
        }
        Err(ScannerError::CommandFailed {
            command: command.to_owned(),
            exit_code: self.exit_code,
            stderr,
        })
    }
}

/// 외부 명령 실행 trait
///
/// 구현체는 `argv[0]`을 실행 파일로, 나머지를 인자로 사용합니다.
/// `timeout`이 지나면 자식 프로세스를 종료하고 [`ScannerError::Timeout`]을 반환해야 합니다.
pub trait CommandRunner: Send + Sync + 'static {
    /// 명령을 실행하고 출력을 반환합니다.
    fn execute(
        &self,
        argv: &[String],
        timeout: Duration,
    ) -> impl Future<Output = Result<CommandOutput, ScannerError>> + Send;
}

/// tokio 프로세스 기반 실행기
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    /// 새 실행기를 생성합니다.
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemCommandRunner {
    async fn execute(
        &self,
        argv: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput, ScannerError> {
        let Some((program, args)) = argv.split_first() else {
            return Err(ScannerError::Spawn {
                program: String::new(),
                reason: "empty command".to_owned(),
            });
        };

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| map_spawn_error(program, e))?;

        // 타임아웃 시 future가 drop되면서 kill_on_drop으로 자식이 종료됨
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| ScannerError::Spawn {
                program: program.clone(),
                reason: e.to_string(),
            })?,
            Err(_) => {
                metrics::counter!(ironwave_core::metrics::SCANNER_COMMAND_TIMEOUTS_TOTAL)
                    .increment(1);
                return Err(ScannerError::Timeout {
                    command: argv.join(" "),
                    secs: timeout.as_secs(),
                });
            }
        };

        debug!(
            command = %argv.join(" "),
            exit_code = ?output.status.code(),
            stdout_bytes = output.stdout.len(),
            "command finished"
        );

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: lossy_capped(&output.stdout),
            stderr: lossy_capped(&output.stderr),
        })
    }
}

fn map_spawn_error(program: &str, err: std::io::Error) -> ScannerError {
    match err.kind() {
        ErrorKind::NotFound => ScannerError::CommandNotFound {
            program: program.to_owned(),
        },
        ErrorKind::PermissionDenied => ScannerError::PermissionDenied {
            program: program.to_owned(),
        },
        _ => ScannerError::Spawn {
            program: program.to_owned(),
            reason: err.to_string(),
        },
    }
}

fn lossy_capped(bytes: &[u8]) -> String {
    let end = bytes.len().min(MAX_OUTPUT_BYTES);
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

fn floor_char_boundary(s: &str, max: usize) -> usize {
    let mut idx = max.min(s.len());
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// 미리 정해둔 응답을 돌려주는 실행기
///
/// 테스트와 오프라인 재현에서 사용합니다.
/// 명령줄(`argv.join(" ")`)별로 응답 큐를 가지며, 마지막 응답은 계속 반복됩니다.
/// 등록되지 않은 명령은 [`ScannerError::CommandNotFound`]를 반환합니다.
#[derive(Debug, Default)]
pub struct ScriptedCommandRunner {
    responses: Mutex<HashMap<String, VecDeque<ScriptedResponse>>>,
    calls: Mutex<Vec<String>>,
}

/// 스크립트 응답
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    /// 명령 출력
    Output(CommandOutput),
    /// 시간 초과
    Timeout,
    /// 실행 파일 없음
    NotFound,
}

impl ScriptedCommandRunner {
    /// 빈 실행기를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 정상 종료 출력을 등록합니다.
    pub fn with_output(self, command: &str, stdout: &str) -> Self {
        self.push(command, ScriptedResponse::Output(CommandOutput::ok(stdout)))
    }

    /// 임의의 출력을 등록합니다.
    pub fn with_response(self, command: &str, output: CommandOutput) -> Self {
        self.push(command, ScriptedResponse::Output(output))
    }

    /// 시간 초과 응답을 등록합니다.
    pub fn with_timeout(self, command: &str) -> Self {
        self.push(command, ScriptedResponse::Timeout)
    }

    /// 실행 파일 없음 응답을 등록합니다.
    pub fn with_not_found(self, command: &str) -> Self {
        self.push(command, ScriptedResponse::NotFound)
    }

    /// 지금까지 실행된 명령줄 목록
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn push(self, command: &str, response: ScriptedResponse) -> Self {
        self.responses
            .lock()
            .entry(command.to_owned())
            .or_default()
            .push_back(response);
        self
    }

    fn next_response(&self, command: &str) -> Option<ScriptedResponse> {
        let mut responses = self.responses.lock();
        let queue = responses.get_mut(command)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl CommandRunner for ScriptedCommandRunner {
    async fn execute(
        &self,
        argv: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput, ScannerError> {
        let command = argv.join(" ");
        self.calls.lock().push(command.clone());

        match self.next_response(&command) {
            Some(ScriptedResponse::Output(output)) => Ok(output),
            Some(ScriptedResponse::Timeout) => Err(ScannerError::Timeout {
                command,
                secs: timeout.as_secs(),
            }),
            Some(ScriptedResponse::NotFound) | None => Err(ScannerError::CommandNotFound {
                program: argv.first().cloned().unwrap_or_default(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn into_result_success_returns_stdout() {
        let out = CommandOutput::ok("hello");
        assert_eq!(out.into_result("echo hello").unwrap(), "hello");
    }

    #[test]
    fn into_result_failure_truncates_stderr() {
        let out = CommandOutput {
            exit_code: Some(1),
            stdout: String::new(),
            stderr: "x".repeat(1000),
        };
        match out.into_result("false") {
            Err(ScannerError::CommandFailed {
                exit_code, stderr, ..
            }) => {
                assert_eq!(exit_code, Some(1));
                assert_eq!(stderr.len(), MAX_STDERR_IN_ERROR);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn floor_char_boundary_respects_utf8() {
        let s = "가나다";
        assert_eq!(floor_char_boundary(s, 4), 3);
        assert_eq!(floor_char_boundary(s, 100), s.len());
    }

    #[tokio::test]
    async fn scripted_runner_last_response_is_sticky() {
        let runner = ScriptedCommandRunner::new()
            .with_output("dumpsys wifi", "first")
            .with_output("dumpsys wifi", "second");
        let cmd = argv(&["dumpsys", "wifi"]);
        let t = Duration::from_secs(1);

        assert_eq!(runner.execute(&cmd, t).await.unwrap().stdout, "first");
        assert_eq!(runner.execute(&cmd, t).await.unwrap().stdout, "second");
        assert_eq!(runner.execute(&cmd, t).await.unwrap().stdout, "second");
        assert_eq!(runner.calls().len(), 3);
    }

    #[tokio::test]
    async fn scripted_runner_unknown_command_is_not_found() {
        let runner = ScriptedCommandRunner::new();
        let err = runner
            .execute(&argv(&["iw", "dev"]), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ScannerError::CommandNotFound { program } if program == "iw"));
    }

    #[tokio::test]
    async fn scripted_runner_timeout_reports_command() {
        let runner = ScriptedCommandRunner::new().with_timeout("termux-wifi-scaninfo");
        let err = runner
            .execute(&argv(&["termux-wifi-scaninfo"]), Duration::from_secs(10))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert!(err.to_string().contains("10s"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn system_runner_missing_binary_is_not_found() {
        let runner = SystemCommandRunner::new();
        let err = runner
            .execute(
                &argv(&["ironwave-definitely-missing-binary"]),
                Duration::from_secs(1),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ScannerError::CommandNotFound { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn system_runner_captures_stdout_and_exit_code() {
        let runner = SystemCommandRunner::new();
        let out = runner
            .execute(&argv(&["sh", "-c", "echo scan; exit 3"]), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(out.stdout.trim(), "scan");
        assert_eq!(out.exit_code, Some(3));
        assert!(!out.success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn system_runner_times_out() {
        let runner = SystemCommandRunner::new();
        let err = runner
            .execute(&argv(&["sleep", "5"]), Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn system_runner_rejects_empty_argv() {
        let runner = SystemCommandRunner::new();
        let err = runner.execute(&[], Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, ScannerError::Spawn { .. }));
    }
}
