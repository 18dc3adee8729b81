//! Daemon orchestration -- assembly, lifecycle and shutdown.
//!
//! The [`Orchestrator`] is the central coordinator of `ironwave-daemon`.
//! It validates configuration, builds the signal scanner, binds the HTTP API,
//! refreshes the aggregated health report and handles shutdown.
//!
//! # Startup Order
//!
//! 1. PID file
//! 2. Signal scanner (capability probe, first cycle)
//! 3. HTTP API listener
//! 4. Uptime updater (metrics only)
//!
//! # Shutdown
//!
//! One `broadcast` signal reaches the acquisition task, the API server and
//! the uptime updater. The scanner is then stopped and the PID file removed.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use ironwave_core::config::IronwaveConfig;
use ironwave_core::metrics as m;
use ironwave_core::pipeline::{HealthStatus, Pipeline};
use ironwave_scanner::{
    CommandRunner, ScannerConfig, SignalScanner, SignalScannerBuilder, StateStore,
    SystemCommandRunner,
};

use crate::api::{self, ApiState};
use crate::health::{API_MODULE, DaemonHealth, ModuleHealth, SCANNER_MODULE};
use crate::metrics_server;
use crate::pid_file::{remove_pid_file, write_pid_file};

/// 헬스 보고서 갱신 주기
const HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(5);

/// 가동 시간 메트릭 갱신 주기
const UPTIME_UPDATE_INTERVAL: Duration = Duration::from_secs(10);

/// The main daemon orchestrator.
pub struct Orchestrator<R = SystemCommandRunner> {
    /// Loaded and validated configuration.
    config: IronwaveConfig,
    /// Signal scanner (single writer of the state store).
    scanner: SignalScanner<R>,
    /// Shutdown broadcast sender (signals all background tasks).
    shutdown_tx: broadcast::Sender<()>,
    /// Latest aggregated health, read by the `/health` handler.
    health_tx: watch::Sender<DaemonHealth>,
    /// HTTP API server task.
    api_task: Option<JoinHandle<Result<()>>>,
    /// Daemon start time (for uptime reporting).
    start_time: Instant,
}

impl Orchestrator<SystemCommandRunner> {
    /// Load configuration and build the orchestrator.
    ///
    /// A missing file is not an error; defaults and environment overrides apply.
    pub async fn build(config_path: &Path) -> Result<Self> {
        let config = IronwaveConfig::load_or_default(config_path)
            .await
            .map_err(|e| anyhow::anyhow!("failed to load config: {}", e))?;
        Self::build_from_config(config)
    }

    /// Build from an already-loaded configuration using real system commands.
    pub fn build_from_config(config: IronwaveConfig) -> Result<Self> {
        Self::build_with_runner(config, SystemCommandRunner::new())
    }
}

impl<R: CommandRunner> Orchestrator<R> {
    /// Build with an explicit command runner.
    ///
    /// # Errors
    ///
    /// - Configuration validation fails
    /// - The metrics recorder cannot be installed
    /// - The scanner configuration is rejected
    pub fn build_with_runner(config: IronwaveConfig, runner: R) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;

        if config.metrics.enabled {
            metrics_server::install_metrics_recorder(&config.metrics)?;
            record_daemon_metrics();
        }

        let (shutdown_tx, _) = broadcast::channel(16);
        let scanner_config = ScannerConfig::from_core(&config.scan);
        tracing::info!(
            interface = %scanner_config.interface,
            capabilities = ?scanner_config.capabilities,
            "initializing signal scanner"
        );

        let scanner = SignalScannerBuilder::with_runner(runner)
            .config(scanner_config)
            .shutdown_sender(shutdown_tx.clone())
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build signal scanner: {}", e))?;

        let (health_tx, _) = watch::channel(DaemonHealth::starting());

        tracing::info!(api_enabled = config.api.enabled, "orchestrator initialized");

        Ok(Self {
            config,
            scanner,
            shutdown_tx,
            health_tx,
            api_task: None,
            start_time: Instant::now(),
        })
    }

    /// Start everything and block until SIGTERM or SIGINT.
    pub async fn run(&mut self) -> Result<()> {
        self.run_until(wait_for_shutdown_signal()).await
    }

    /// Start everything and block until `shutdown` resolves.
    ///
    /// The future yields the name of the trigger for logging.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = Result<&'static str>>,
    {
        let pid_file = self.pid_file_path();
        if let Some(path) = &pid_file {
            write_pid_file(path)?;
        }

        let result = self.serve(shutdown).await;

        if let Some(path) = &pid_file {
            remove_pid_file(path);
        }
        result
    }

    async fn serve<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = Result<&'static str>>,
    {
        tracing::info!("starting signal scanner");
        self.scanner
            .start()
            .await
            .map_err(|e| anyhow::anyhow!("failed to start signal scanner: {}", e))?;

        if self.config.api.enabled {
            let listener = match api::bind(&self.config.api).await {
                Ok(listener) => listener,
                Err(e) => {
                    tracing::warn!("api bind failed, stopping signal scanner");
                    if let Err(stop_err) = self.scanner.stop().await {
                        tracing::error!(
                            startup_error = %e,
                            rollback_error = %stop_err,
                            "rollback also failed during startup failure cleanup"
                        );
                    }
                    return Err(e);
                }
            };
            let app = api::router(ApiState::new(self.scanner.store(), self.health_tx.subscribe()));
            self.api_task = Some(api::spawn_server(
                listener,
                app,
                self.shutdown_tx.subscribe(),
            ));
        }

        let mut uptime_task = self
            .config
            .metrics
            .enabled
            .then(|| spawn_uptime_updater(self.start_time, self.shutdown_tx.subscribe()));

        self.refresh_health().await;

        let mut health_tick = tokio::time::interval(HEALTH_CHECK_INTERVAL);
        health_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut shutdown = std::pin::pin!(shutdown);

        tracing::info!("entering main loop");
        let trigger = loop {
            tokio::select! {
                trigger = &mut shutdown => break trigger,
                _ = health_tick.tick() => self.refresh_health().await,
            }
        };
        match &trigger {
            Ok(signal) => tracing::info!(signal = *signal, "shutdown signal received"),
            Err(e) => tracing::error!(error = %e, "shutdown signal handler failed"),
        }

        tracing::info!("broadcasting shutdown signal to all tasks");
        let _ = self.shutdown_tx.send(());

        if let Some(task) = self.api_task.take() {
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!(error = %e, "api server exited with error"),
                Err(e) => tracing::error!(error = %e, "api server task panicked"),
            }
        }
        if let Some(task) = uptime_task.take() {
            let _ = task.await;
        }

        self.shutdown().await?;
        trigger.map(|_| ())
    }

    async fn shutdown(&mut self) -> Result<()> {
        tracing::info!("stopping signal scanner");
        self.scanner
            .stop()
            .await
            .map_err(|e| anyhow::anyhow!("failed to stop signal scanner: {}", e))
    }

    async fn refresh_health(&self) {
        let report = self.health().await;
        if !report.status.is_healthy() {
            tracing::debug!(status = %report.status, "daemon health degraded");
        }
        self.health_tx.send_replace(report);
    }

    /// Get the current aggregated health status.
    pub async fn health(&self) -> DaemonHealth {
        let scanner = ModuleHealth::enabled(SCANNER_MODULE, self.scanner.health_check().await);
        let api = if !self.config.api.enabled {
            ModuleHealth::disabled(API_MODULE)
        } else {
            let status = match &self.api_task {
                Some(task) if task.is_finished() => {
                    HealthStatus::Unhealthy("api server exited".to_owned())
                }
                Some(_) => HealthStatus::Healthy,
                None => HealthStatus::Unhealthy("api server not started".to_owned()),
            };
            ModuleHealth::enabled(API_MODULE, status)
        };

        let uptime_secs = self.start_time.elapsed().as_secs();
        if self.config.metrics.enabled {
            #[allow(clippy::cast_precision_loss)]
            metrics::gauge!(m::DAEMON_UPTIME_SECONDS).set(uptime_secs as f64);
        }

        let method = self.scanner.state().kind().map(|k| k.name().to_owned());
        DaemonHealth::from_modules(vec![scanner, api], method, uptime_secs)
    }

    /// Receiver for the latest published health report.
    pub fn health_receiver(&self) -> watch::Receiver<DaemonHealth> {
        self.health_tx.subscribe()
    }

    /// State store shared with the API handlers.
    pub fn store(&self) -> StateStore {
        self.scanner.store()
    }

    /// Get a reference to the loaded configuration.
    pub fn config(&self) -> &IronwaveConfig {
        &self.config
    }

    fn pid_file_path(&self) -> Option<PathBuf> {
        let path = &self.config.general.pid_file;
        (!path.is_empty()).then(|| PathBuf::from(path))
    }
}

/// Wait for a shutdown signal (SIGTERM or SIGINT).
///
/// Returns the name of the signal that triggered the shutdown.
#[cfg(unix)]
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("failed to install SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("failed to install SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("failed to install Ctrl+C handler: {}", e))?;
    Ok("CTRL_C")
}

/// Record daemon-level metrics (build info).
fn record_daemon_metrics() {
    metrics::gauge!(m::DAEMON_BUILD_INFO, "version" => env!("CARGO_PKG_VERSION")).set(1.0);
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "daemon metrics recorded");
}

/// Spawn a background task that periodically updates the uptime metric.
fn spawn_uptime_updater(
    start_time: Instant,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(UPTIME_UPDATE_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let uptime_secs = start_time.elapsed().as_secs();
                    #[allow(clippy::cast_precision_loss)]
                    metrics::gauge!(m::DAEMON_UPTIME_SECONDS).set(uptime_secs as f64);
                }
                _ = shutdown_rx.recv() => {
                    tracing::debug!("uptime updater shutting down");
                    break;
                }
            }
        }
    })
}
