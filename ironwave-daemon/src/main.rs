use anyhow::Result;
use clap::Parser;

use ironwave_core::config::IronwaveConfig;
use ironwave_daemon::cli::DaemonCli;
use ironwave_daemon::logging;
use ironwave_daemon::orchestrator::Orchestrator;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DaemonCli::parse();

    // 설정 로드 (파일이 없으면 기본값) 후 CLI 오버라이드 적용
    let mut config = IronwaveConfig::load_or_default(&cli.config)
        .await
        .map_err(|e| anyhow::anyhow!("failed to load config {}: {}", cli.config.display(), e))?;
    cli.apply_overrides(&mut config);
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;

    if cli.validate {
        println!("configuration is valid: {}", cli.config.display());
        return Ok(());
    }

    logging::init_tracing(&config.general, cli.log_level.as_deref())?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        "ironwave-daemon starting"
    );

    let mut orchestrator = Orchestrator::build_from_config(config)?;
    orchestrator.run().await?;

    tracing::info!("ironwave-daemon shut down");
    Ok(())
}
