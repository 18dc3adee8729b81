//! Logging initialization for ironwave-daemon.
//!
//! Configures `tracing-subscriber` from the `[general]` section of
//! `IronwaveConfig`.
//!
//! Level precedence: `--log-level` > `RUST_LOG` > `general.log_level`.

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use ironwave_core::config::GeneralConfig;

/// Initialize the global tracing subscriber.
///
/// Must be called exactly once, before any tracing macros are used.
///
/// # Formats
///
/// * `"json"` - one JSON object per line
/// * `"pretty"` - human-readable multi-line output
pub fn init_tracing(config: &GeneralConfig, level_override: Option<&str>) -> Result<()> {
    let env_filter = match level_override {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
    };

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match config.log_format.as_str() {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        "pretty" => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
        other => {
            return Err(anyhow::anyhow!(
                "unknown log format '{}', expected 'json' or 'pretty'",
                other
            ));
        }
    };

    result.map_err(|e| {
        anyhow::anyhow!(
            "failed to initialize {} tracing subscriber: {}",
            config.log_format,
            e
        )
    })
}
