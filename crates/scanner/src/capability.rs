//! 수집 방식 탐지 -- 호스트에서 사용할 수 있는 스캔 방법 선택
//!
//! [`CapabilityKind`]는 무선 스캔 데이터를 얻는 방법을 열거하고,
//! 각 변형이 자신의 탐지 명령, 스캔 계획, 스캔 간격을 알고 있습니다.
//!
//! [`CapabilityProber`]는 고정된 순서로 후보를 시도하여 첫 번째로
//! 사용 가능한 방식을 선택합니다.
//!
//! # 탐지 순서
//!
//! ```text
//! iw (root) -> wpa_cli (root) -> termux -> dumpsys -> proc -> (없음: demo)
//! ```
//!
//! 권한이 필요한 방식은 프로세스를 생성하기 전에 실효 UID를 확인하여 건너뜁니다.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::command::{CommandOutput, CommandRunner};
use crate::config::ScannerConfig;
use crate::error::ScannerError;

/// 탐지 출력이 이 길이보다 길면 형식 마커 없이도 유효한 것으로 간주
const MIN_PROBE_OUTPUT_LEN: usize = 50;

/// 수집 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    /// `iw dev <if> scan` -- 링크 계층 물리 스캔 (root 필요)
    LinkLayer,
    /// `wpa_cli scan_results` -- supplicant 제어 인터페이스 (root 필요)
    Supplicant,
    /// `termux-wifi-scaninfo` -- JSON 레코드 목록
    Structured,
    /// `dumpsys wifi` -- Android 진단 덤프
    DiagnosticDump,
    /// `/proc/net/wireless` -- 현재 연결된 네트워크의 링크 품질만 제공
    ProcStats,
    /// 고정 예시 데이터
    Demo,
}

impl CapabilityKind {
    /// 탐지 순서 (`Demo`는 폴백 전용이라 포함하지 않음)
    pub const PROBE_ORDER: [Self; 5] = [
        Self::LinkLayer,
        Self::Supplicant,
        Self::Structured,
        Self::DiagnosticDump,
        Self::ProcStats,
    ];

    /// API와 설정에서 사용하는 이름
    pub fn name(self) -> &'static str {
        match self {
            Self::LinkLayer => "iw",
            Self::Supplicant => "wpa_cli",
            Self::Structured => "termux",
            Self::DiagnosticDump => "dumpsys",
            Self::ProcStats => "proc",
            Self::Demo => "demo",
        }
    }

    /// 이름에서 수집 방식을 찾습니다.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "iw" => Some(Self::LinkLayer),
            "wpa_cli" => Some(Self::Supplicant),
            "termux" => Some(Self::Structured),
            "dumpsys" => Some(Self::DiagnosticDump),
            "proc" => Some(Self::ProcStats),
            "demo" => Some(Self::Demo),
            _ => None,
        }
    }

    /// root 권한이 필요한지 여부
    pub fn requires_privilege(self) -> bool {
        matches!(self, Self::LinkLayer | Self::Supplicant)
    }

    /// 탐지에 사용할 명령. `Demo`는 탐지하지 않습니다.
    ///
    /// `iw`는 물리 스캔을 일으키지 않도록 캐시된 결과(`scan dump`)로 탐지합니다.
    /// 캐시가 비어 있어도 0으로 종료하면 사용 가능한 것으로 봅니다.
    pub fn probe_command(self, interface: &str) -> Option<Vec<String>> {
        let argv: &[&str] = match self {
            Self::LinkLayer => &["iw", "dev", interface, "scan", "dump"],
            Self::Supplicant => &["wpa_cli", "-i", interface, "scan_results"],
            Self::Structured => &["termux-wifi-scaninfo"],
            Self::DiagnosticDump => &["dumpsys", "wifi"],
            Self::ProcStats => &["cat", "/proc/net/wireless"],
            Self::Demo => return None,
        };
        Some(argv.iter().map(|s| (*s).to_owned()).collect())
    }

    /// 한 사이클의 스캔 계획. `Demo`는 외부 명령이 없습니다.
    pub fn scan_plan(self, interface: &str) -> Option<ScanPlan> {
        let plan = match self {
            Self::LinkLayer => ScanPlan::single(
                CommandSpec::new(&["iw", "dev", interface, "scan"], Duration::from_secs(8)),
            ),
            Self::Supplicant => ScanPlan {
                // 스캔을 트리거한 뒤 결과가 채워질 때까지 잠시 대기
                prepare: vec![CommandSpec::new(
                    &["wpa_cli", "-i", interface, "scan"],
                    Duration::from_secs(2),
                )],
                settle: Duration::from_secs(1),
                scan: CommandSpec::new(
                    &["wpa_cli", "-i", interface, "scan_results"],
                    Duration::from_secs(5),
                ),
            },
            Self::Structured => ScanPlan::single(CommandSpec::new(
                &["termux-wifi-scaninfo"],
                Duration::from_secs(10),
            )),
            Self::DiagnosticDump => ScanPlan::single(CommandSpec::new(
                &["dumpsys", "wifi"],
                Duration::from_secs(8),
            )),
            Self::ProcStats => ScanPlan::single(CommandSpec::new(
                &["cat", "/proc/net/wireless"],
                Duration::from_secs(2),
            )),
            Self::Demo => return None,
        };
        Some(plan)
    }

    /// 기본 스캔 간격
    ///
    /// 물리 스캔을 일으키는 `iw`가 가장 길고, 데모와 `proc`가 가장 짧습니다.
    pub fn default_interval(self) -> Duration {
        match self {
            Self::LinkLayer => Duration::from_secs(8),
            Self::Supplicant | Self::Structured | Self::DiagnosticDump => Duration::from_secs(6),
            Self::ProcStats | Self::Demo => Duration::from_secs(5),
        }
    }

    /// 탐지 출력이 이 방식의 형식으로 보이는지 확인합니다.
    fn accepts_probe_output(self, stdout: &str) -> bool {
        let has_marker = match self {
            // 캐시가 비어 있으면 `scan dump`는 출력 없이 0으로 종료됨
            Self::LinkLayer => {
                stdout.trim().is_empty() || stdout.lines().any(|l| l.starts_with("BSS "))
            }
            Self::Supplicant => stdout.contains("bssid / frequency"),
            Self::Structured => stdout.trim_start().starts_with('['),
            Self::DiagnosticDump => stdout.contains("Latest scan results"),
            // 헤더 2줄만 있으면 무선 인터페이스가 없는 것
            Self::ProcStats => {
                return stdout.lines().skip(2).any(|l| l.contains(':'));
            }
            Self::Demo => false,
        };
        has_marker || stdout.len() > MIN_PROBE_OUTPUT_LEN
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 타임아웃이 붙은 외부 명령
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// 명령과 인자
    pub argv: Vec<String>,
    /// 실행 타임아웃
    pub timeout: Duration,
}

impl CommandSpec {
    fn new(argv: &[&str], timeout: Duration) -> Self {
        Self {
            argv: argv.iter().map(|s| (*s).to_owned()).collect(),
            timeout,
        }
    }

    /// 로그/에러 메시지용 명령줄
    pub fn display(&self) -> String {
        self.argv.join(" ")
    }
}

/// 한 사이클의 명령 실행 계획
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPlan {
    /// 스캔 전에 실행하는 명령 (실패해도 무시)
    pub prepare: Vec<CommandSpec>,
    /// 준비 명령 후 대기 시간
    pub settle: Duration,
    /// 출력을 파싱할 스캔 명령
    pub scan: CommandSpec,
}

impl ScanPlan {
    fn single(scan: CommandSpec) -> Self {
        Self {
            prepare: Vec::new(),
            settle: Duration::ZERO,
            scan,
        }
    }
}

/// 현재 프로세스가 root 권한으로 실행 중인지 확인합니다.
///
/// 시작 시 한 번만 호출하여 [`CapabilityProber`]에 전달합니다.
pub fn is_privileged() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: geteuid는 인자가 없고 실패하지 않으며 전역 상태를 변경하지 않습니다.
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}

/// 단일 후보의 탐지 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// 사용 가능
    Accepted,
    /// 설정에서 제외됨
    Disabled,
    /// root 권한이 없어 시도하지 않음
    SkippedUnprivileged,
    /// 명령 실행 실패 (없음, 권한, 타임아웃, 비정상 종료)
    Failed(String),
    /// 정상 종료했지만 출력이 형식에 맞지 않음
    Rejected(String),
}

impl ProbeOutcome {
    /// 사용 가능 여부
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// 후보별 탐지 보고 (CLI `probe` 출력용)
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    /// 수집 방식
    pub kind: CapabilityKind,
    /// 탐지 결과
    pub outcome: ProbeOutcome,
}

/// 수집 방식 탐지기
pub struct CapabilityProber<R> {
    runner: Arc<R>,
    interface: String,
    allowed: Vec<CapabilityKind>,
    probe_timeout: Duration,
    privileged: bool,
}

impl<R: CommandRunner> CapabilityProber<R> {
    /// 탐지기를 생성합니다.
    ///
    /// `privileged`는 [`is_privileged`]의 결과를 전달합니다 (테스트에서는 직접 지정).
    pub fn new(runner: Arc<R>, config: &ScannerConfig, privileged: bool) -> Self {
        Self {
            runner,
            interface: config.interface.clone(),
            allowed: config.capabilities.clone(),
            probe_timeout: config.probe_timeout,
            privileged,
        }
    }

    /// 탐지 순서대로 후보를 시도하여 첫 번째로 사용 가능한 방식을 반환합니다.
    ///
    /// 사용 가능한 방식이 없으면 `None`을 반환합니다.
    pub async fn detect(&self) -> Option<CapabilityKind> {
        for kind in CapabilityKind::PROBE_ORDER {
            let outcome = self.probe(kind).await;
            match &outcome {
                ProbeOutcome::Accepted => {
                    info!(method = %kind, "scan capability selected");
                    return Some(kind);
                }
                ProbeOutcome::Disabled | ProbeOutcome::SkippedUnprivileged => {
                    debug!(method = %kind, outcome = ?outcome, "capability skipped");
                }
                ProbeOutcome::Failed(reason) | ProbeOutcome::Rejected(reason) => {
                    debug!(method = %kind, reason = %reason, "capability not usable");
                }
            }
        }

        warn!("no scan capability available");
        None
    }

    /// 모든 후보를 탐지하여 결과를 보고합니다.
    pub async fn probe_all(&self) -> Vec<ProbeReport> {
        let mut reports = Vec::with_capacity(CapabilityKind::PROBE_ORDER.len());
        for kind in CapabilityKind::PROBE_ORDER {
            let outcome = self.probe(kind).await;
            reports.push(ProbeReport { kind, outcome });
        }
        reports
    }

    /// 단일 후보를 탐지합니다.
    pub async fn probe(&self, kind: CapabilityKind) -> ProbeOutcome {
        if !self.allowed.contains(&kind) {
            return ProbeOutcome::Disabled;
        }
        // 권한 확인은 반드시 프로세스 생성 전에
        if kind.requires_privilege() && !self.privileged {
            return ProbeOutcome::SkippedUnprivileged;
        }
        let Some(argv) = kind.probe_command(&self.interface) else {
            return ProbeOutcome::Disabled;
        };

        match self.runner.execute(&argv, self.probe_timeout).await {
            Ok(output) => evaluate_probe_output(kind, &output),
            Err(e) => ProbeOutcome::Failed(e.to_string()),
        }
    }
}

fn evaluate_probe_output(kind: CapabilityKind, output: &CommandOutput) -> ProbeOutcome {
    if !output.success() {
        return ProbeOutcome::Failed(describe_failure(output));
    }
    if kind.accepts_probe_output(&output.stdout) {
        ProbeOutcome::Accepted
    } else {
        ProbeOutcome::Rejected(format!(
            "unrecognized output ({} bytes)",
            output.stdout.len()
        ))
    }
}

/// stderr에서 권한/미설치 여부만 추정합니다. 다른 내용은 해석하지 않습니다.
fn describe_failure(output: &CommandOutput) -> String {
    let stderr = output.stderr.to_lowercase();
    let hint = if stderr.contains("permission denied") || stderr.contains("not permitted") {
        "permission denied"
    } else if stderr.contains("not found") || stderr.contains("no such") {
        "not found"
    } else {
        "command failed"
    };
    match output.exit_code {
        Some(code) => format!("{hint} (exit code {code})"),
        None => format!("{hint} (terminated by signal)"),
    }
}

impl From<ScannerError> for ProbeOutcome {
    fn from(err: ScannerError) -> Self {
        Self::Failed(err.to_string())
    }
}
