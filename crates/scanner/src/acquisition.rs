//! 수집 루프 -- 탐지, 스캔, 파싱, 보강, 발행
//!
//! [`SignalScanner`]는 core의 [`Pipeline`] trait을 구현하여
//! `ironwave-daemon`에서 다른 모듈과 동일한 생명주기로 관리됩니다.
//!
//! # 내부 아키텍처
//!
//! ```text
//! CapabilityProber --(kind)--> ScanPlan --> CommandRunner --> SignalParser
//!        ^                                                        |
//!        | (연속 빈 사이클 N회)                                    v
//!        +----------------- acquisition task <------------- Enricher
//!                                   |
//!                                   v
//!                              StateStore --> API 핸들러
//! ```
//!
//! # 상태 전이
//!
//! ```text
//! Unprobed -> Probing -> Active(kind) -> Degraded(kind) -> Probing -> Active(kind')
//! ```
//!
//! 한 사이클에서 발생한 에러는 로그로 남기고 빈 스냅샷으로 발행합니다.
//! 루프는 종료 신호를 받을 때만 멈춥니다.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use ironwave_core::error::{IronwaveError, PipelineError};
use ironwave_core::metrics as m;
use ironwave_core::pipeline::{HealthStatus, Pipeline};
use ironwave_core::types::Snapshot;

use crate::capability::{CapabilityKind, CapabilityProber, ProbeReport, is_privileged};
use crate::command::{CommandRunner, SystemCommandRunner};
use crate::config::ScannerConfig;
use crate::demo::demo_signals;
use crate::enrich::Enricher;
use crate::error::ScannerError;
use crate::parser::{ProvisionalSignal, parser_for};
use crate::store::StateStore;

/// `stop()`이 수집 태스크 종료를 기다리는 최대 시간
const STOP_GRACE: Duration = Duration::from_secs(5);

/// 수집 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionState {
    /// 아직 탐지하지 않음
    Unprobed,
    /// 탐지 중
    Probing,
    /// 수집 중
    Active(CapabilityKind),
    /// 연속 빈 사이클로 재탐지 대기
    Degraded(CapabilityKind),
}

impl AcquisitionState {
    /// 현재 수집 방식 (탐지 전에는 `None`)
    pub fn kind(self) -> Option<CapabilityKind> {
        match self {
            Self::Active(kind) | Self::Degraded(kind) => Some(kind),
            Self::Unprobed | Self::Probing => None,
        }
    }
}

/// 생명주기 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Initialized,
    Running,
    Stopped,
}

/// 사이클 결과 분류 (메트릭 레이블)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleResult {
    Success,
    Empty,
    Failure,
}

impl CycleResult {
    fn label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Empty => "empty",
            Self::Failure => "failure",
        }
    }
}

/// 수집 태스크와 스캐너가 공유하는 구성 요소
struct Acquirer<R> {
    config: ScannerConfig,
    runner: Arc<R>,
    prober: CapabilityProber<R>,
    enricher: Enricher,
    store: StateStore,
    state: Mutex<AcquisitionState>,
    cycles: AtomicU64,
    empty_streak: AtomicU32,
}

impl<R: CommandRunner> Acquirer<R> {
    fn state(&self) -> AcquisitionState {
        *self.state.lock()
    }

    fn set_state(&self, state: AcquisitionState) {
        *self.state.lock() = state;
    }

    /// 탐지 후 사용할 수집 방식을 결정합니다.
    ///
    /// 탐지 실패 시 데모 폴백이 허용되면 `Demo`, 아니면 `NoCapability`입니다.
    async fn select_kind(&self) -> Result<CapabilityKind, ScannerError> {
        match self.detect_kind().await {
            Some(kind) => Ok(kind),
            None if self.config.allow_demo_fallback => {
                warn!("falling back to demo data");
                Ok(CapabilityKind::Demo)
            }
            None => Err(ScannerError::NoCapability),
        }
    }

    async fn detect_kind(&self) -> Option<CapabilityKind> {
        self.set_state(AcquisitionState::Probing);
        let detected = self.prober.detect().await;
        let selected = detected.map_or("none", CapabilityKind::name);
        metrics::counter!(m::SCANNER_PROBES_TOTAL, m::LABEL_METHOD => selected).increment(1);
        detected
    }

    /// 외부 명령을 실행하고 출력을 파싱합니다.
    async fn collect(
        &self,
        kind: CapabilityKind,
        cycle: u64,
    ) -> Result<Vec<ProvisionalSignal>, ScannerError> {
        let (Some(plan), Some(parser)) = (kind.scan_plan(&self.config.interface), parser_for(kind))
        else {
            return Ok(demo_signals(cycle));
        };

        for step in &plan.prepare {
            // 준비 명령은 실패해도 스캔 결과 조회를 계속 시도
            if let Err(e) = self.runner.execute(&step.argv, step.timeout).await {
                debug!(command = %step.display(), error = %e, "prepare command failed");
            }
        }
        if !plan.settle.is_zero() {
            tokio::time::sleep(plan.settle).await;
        }

        let command = plan.scan.display();
        let output = self
            .runner
            .execute(&plan.scan.argv, plan.scan.timeout)
            .await?;
        let stdout = output.into_result(&command)?;
        Ok(parser.parse_lenient(&stdout))
    }

    /// 한 사이클을 실행하고 결과를 발행합니다.
    async fn run_cycle(&self, kind: CapabilityKind) -> Arc<Snapshot> {
        let started = Instant::now();
        let cycle = self.cycles.fetch_add(1, Ordering::Relaxed);

        let collected = self.collect(kind, cycle).await;
        let observed_at = Utc::now();
        let (signals, result) = match collected {
            Ok(provisional) if provisional.is_empty() => (Vec::new(), CycleResult::Empty),
            Ok(provisional) => (
                self.enricher.enrich_all(provisional, observed_at),
                CycleResult::Success,
            ),
            Err(e) => {
                warn!(method = %kind, error = %e, "scan cycle failed, publishing empty snapshot");
                (Vec::new(), CycleResult::Failure)
            }
        };

        let snapshot = self
            .store
            .publish(Snapshot::new(signals, kind.name(), observed_at));

        if result == CycleResult::Success {
            self.empty_streak.store(0, Ordering::Relaxed);
        } else {
            self.empty_streak.fetch_add(1, Ordering::Relaxed);
        }

        let elapsed = started.elapsed();
        metrics::counter!(
            m::SCANNER_CYCLES_TOTAL,
            m::LABEL_METHOD => kind.name(),
            m::LABEL_RESULT => result.label()
        )
        .increment(1);
        metrics::histogram!(m::SCANNER_CYCLE_DURATION_SECONDS).record(elapsed.as_secs_f64());
        metrics::gauge!(m::SCANNER_SIGNALS_OBSERVED).set(snapshot.len() as f64);
        metrics::gauge!(m::SCANNER_HIGH_RISK_SIGNALS).set(snapshot.high_risk_count() as f64);

        debug!(
            method = %kind,
            cycle,
            signals = snapshot.len(),
            result = result.label(),
            elapsed_ms = elapsed.as_millis() as u64,
            "scan cycle completed"
        );
        snapshot
    }

    /// 연속 빈 사이클이 임계값에 도달했는지 확인합니다.
    fn should_reprobe(&self, kind: CapabilityKind) -> bool {
        let threshold = self.config.reprobe_after_empty_cycles;
        kind != CapabilityKind::Demo
            && threshold > 0
            && self.empty_streak.load(Ordering::Relaxed) >= threshold
    }

    /// 재탐지합니다. 아무것도 찾지 못하면 데모로 전환하지 않고 기존 방식을 유지합니다.
    ///
    /// 일시적인 실패 뒤에 도구가 복구되면 다음 사이클부터 다시 실제 데이터를 수집합니다.
    async fn reprobe(&self, current: CapabilityKind) -> CapabilityKind {
        warn!(
            method = %current,
            empty_cycles = self.empty_streak.load(Ordering::Relaxed),
            "consecutive empty cycles, re-probing capabilities"
        );
        self.set_state(AcquisitionState::Degraded(current));

        let next = match self.detect_kind().await {
            Some(kind) => kind,
            None => {
                warn!(method = %current, "re-probe found nothing, keeping current method");
                current
            }
        };
        if next != current {
            info!(from = %current, to = %next, "scan capability changed");
        }
        self.empty_streak.store(0, Ordering::Relaxed);
        self.set_state(AcquisitionState::Active(next));
        next
    }

    /// 종료 신호를 받을 때까지 사이클을 반복합니다.
    async fn run(self: Arc<Self>, mut kind: CapabilityKind, mut shutdown: broadcast::Receiver<()>) {
        info!(method = %kind, "acquisition loop started");

        loop {
            // 사이클 도중에도 종료 가능 (자식 프로세스는 kill_on_drop으로 정리)
            tokio::select! {
                _ = self.run_cycle(kind) => {}
                _ = shutdown.recv() => break,
            }

            if self.should_reprobe(kind) {
                tokio::select! {
                    next = self.reprobe(kind) => kind = next,
                    _ = shutdown.recv() => break,
                }
            }

            let interval = self.config.interval_for(kind);
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = shutdown.recv() => break,
            }
        }

        info!("acquisition loop stopped");
    }
}

/// 무선 신호 수집기
///
/// 시작 시 수집 방식을 탐지하고, 백그라운드 태스크에서 주기적으로 스캔하여
/// [`StateStore`]에 스냅샷을 발행합니다.
pub struct SignalScanner<R = SystemCommandRunner> {
    acquirer: Arc<Acquirer<R>>,
    lifecycle: Lifecycle,
    shutdown_tx: broadcast::Sender<()>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl<R: CommandRunner> SignalScanner<R> {
    /// 상태 저장소 핸들 (API 핸들러에 전달)
    pub fn store(&self) -> StateStore {
        self.acquirer.store.clone()
    }

    /// 현재 수집 상태
    pub fn state(&self) -> AcquisitionState {
        self.acquirer.state()
    }

    /// 생명주기 상태 이름
    pub fn state_name(&self) -> &'static str {
        match self.lifecycle {
            Lifecycle::Initialized => "initialized",
            Lifecycle::Running => "running",
            Lifecycle::Stopped => "stopped",
        }
    }

    /// 실행된 사이클 수
    pub fn cycles_completed(&self) -> u64 {
        self.acquirer.cycles.load(Ordering::Relaxed)
    }

    /// 스캐너 설정
    pub fn config(&self) -> &ScannerConfig {
        &self.acquirer.config
    }

    /// 모든 후보를 탐지하여 결과를 보고합니다. 상태는 바꾸지 않습니다.
    pub async fn probe_all(&self) -> Vec<ProbeReport> {
        self.acquirer.prober.probe_all().await
    }

    /// 루프 없이 한 사이클을 실행합니다.
    ///
    /// 아직 수집 방식이 정해지지 않았으면 먼저 탐지합니다.
    pub async fn scan_once(&self) -> Result<Arc<Snapshot>, ScannerError> {
        let kind = match self.acquirer.state().kind() {
            Some(kind) => kind,
            None => {
                let kind = self.acquirer.select_kind().await.inspect_err(|_| {
                    self.acquirer.set_state(AcquisitionState::Unprobed);
                })?;
                self.acquirer.set_state(AcquisitionState::Active(kind));
                kind
            }
        };
        Ok(self.acquirer.run_cycle(kind).await)
    }
}

impl<R: CommandRunner> Pipeline for SignalScanner<R> {
    async fn start(&mut self) -> Result<(), IronwaveError> {
        if self.lifecycle == Lifecycle::Running {
            return Err(PipelineError::AlreadyRunning.into());
        }

        info!(interface = %self.acquirer.config.interface, "starting signal scanner");

        let kind = match self.acquirer.state() {
            AcquisitionState::Active(kind) | AcquisitionState::Degraded(kind) => kind,
            AcquisitionState::Unprobed | AcquisitionState::Probing => {
                match self.acquirer.select_kind().await {
                    Ok(kind) => kind,
                    Err(e) => {
                        self.acquirer.set_state(AcquisitionState::Unprobed);
                        return Err(e.into());
                    }
                }
            }
        };
        self.acquirer.set_state(AcquisitionState::Active(kind));

        let acquirer = Arc::clone(&self.acquirer);
        let shutdown = self.shutdown_tx.subscribe();
        self.task = Some(tokio::spawn(acquirer.run(kind, shutdown)));

        self.lifecycle = Lifecycle::Running;
        info!(method = %kind, "signal scanner started");
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), IronwaveError> {
        if self.lifecycle != Lifecycle::Running {
            return Err(PipelineError::NotRunning.into());
        }

        info!("stopping signal scanner");
        // 수신자가 없으면(이미 종료) 에러이므로 무시
        let _ = self.shutdown_tx.send(());

        if let Some(mut task) = self.task.take() {
            if tokio::time::timeout(STOP_GRACE, &mut task).await.is_err() {
                warn!("acquisition task did not stop in time, aborting");
                task.abort();
                let _ = task.await;
            }
        }

        self.lifecycle = Lifecycle::Stopped;
        info!("signal scanner stopped");
        Ok(())
    }

    async fn health_check(&self) -> HealthStatus {
        match self.lifecycle {
            Lifecycle::Initialized => return HealthStatus::Unhealthy("not started".to_owned()),
            Lifecycle::Stopped => return HealthStatus::Unhealthy("stopped".to_owned()),
            Lifecycle::Running => {}
        }

        if self.task.as_ref().is_some_and(|t| t.is_finished()) {
            return HealthStatus::Unhealthy("acquisition task exited".to_owned());
        }

        match self.acquirer.state() {
            AcquisitionState::Active(CapabilityKind::Demo) => HealthStatus::Degraded(
                "no scan capability available, serving demo data".to_owned(),
            ),
            AcquisitionState::Active(_) => HealthStatus::Healthy,
            AcquisitionState::Degraded(kind) => {
                HealthStatus::Degraded(format!("re-probing after empty cycles on {kind}"))
            }
            AcquisitionState::Probing | AcquisitionState::Unprobed => {
                HealthStatus::Degraded("probing scan capabilities".to_owned())
            }
        }
    }
}

/// 신호 수집기 빌더
pub struct SignalScannerBuilder<R = SystemCommandRunner> {
    config: ScannerConfig,
    runner: Arc<R>,
    store: Option<StateStore>,
    privileged: Option<bool>,
    shutdown_tx: Option<broadcast::Sender<()>>,
}

impl SignalScannerBuilder<SystemCommandRunner> {
    /// 시스템 명령 실행기로 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::with_runner(SystemCommandRunner::new())
    }
}

impl Default for SignalScannerBuilder<SystemCommandRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner> SignalScannerBuilder<R> {
    /// 지정한 명령 실행기로 새 빌더를 생성합니다.
    pub fn with_runner(runner: R) -> Self {
        Self {
            config: ScannerConfig::default(),
            runner: Arc::new(runner),
            store: None,
            privileged: None,
            shutdown_tx: None,
        }
    }

    /// 스캐너 설정을 지정합니다.
    pub fn config(mut self, config: ScannerConfig) -> Self {
        self.config = config;
        self
    }

    /// 외부 상태 저장소를 사용합니다.
    ///
    /// 설정하지 않으면 `history_size` 크기로 새로 생성합니다.
    pub fn store(mut self, store: StateStore) -> Self {
        self.store = Some(store);
        self
    }

    /// 권한 여부를 직접 지정합니다. 지정하지 않으면 실효 UID로 판단합니다.
    pub fn privileged(mut self, privileged: bool) -> Self {
        self.privileged = Some(privileged);
        self
    }

    /// 외부 종료 신호 채널을 사용합니다.
    pub fn shutdown_sender(mut self, tx: broadcast::Sender<()>) -> Self {
        self.shutdown_tx = Some(tx);
        self
    }

    /// 수집기를 빌드합니다.
    pub fn build(self) -> Result<SignalScanner<R>, ScannerError> {
        self.config.validate()?;

        let privileged = self.privileged.unwrap_or_else(is_privileged);
        let store = self
            .store
            .unwrap_or_else(|| StateStore::new(self.config.history_size));
        let shutdown_tx = self
            .shutdown_tx
            .unwrap_or_else(|| broadcast::channel(1).0);
        let prober = CapabilityProber::new(Arc::clone(&self.runner), &self.config, privileged);
        let enricher = Enricher::new(self.config.risk_policy.clone());

        debug!(privileged, interface = %self.config.interface, "signal scanner built");

        Ok(SignalScanner {
            acquirer: Arc::new(Acquirer {
                config: self.config,
                runner: self.runner,
                prober,
                enricher,
                store,
                state: Mutex::new(AcquisitionState::Unprobed),
                cycles: AtomicU64::new(0),
                empty_streak: AtomicU32::new(0),
            }),
            lifecycle: Lifecycle::Initialized,
            shutdown_tx,
            task: None,
        })
    }
}
