use conduit_core::ConduitConfig;
use conduit_error::{ConduitResult, ConfigError, UnexpectedError};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise `log_level` (e.g. `"INFO"`) applies to
/// everything, and at debug or trace the conduit crates log at that level too.
///
/// # Errors
///
/// Returns a configuration error for an unparseable level, or an unexpected
/// error if a global subscriber is already installed.
pub fn init_tracing(log_level: &str) -> ConduitResult<()> {
    let level = log_level.trim().to_lowercase();
    let fallback = match level.as_str() {
        "debug" | "trace" => format!("{level},conduit={level}"),
        _ => level.clone(),
    };

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&fallback).map_err(|e| {
            ConfigError::new(format!("Invalid log level '{}': {}", log_level, e))
        })?,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(UnexpectedError::wrap)?;

    info!(log_level = %level, "Tracing initialized");
    Ok(())
}

/// Install the subscriber described by the global configuration.
///
/// Does nothing when `telemetry_enabled` is off.
pub fn init_tracing_from_config(config: &ConduitConfig) -> ConduitResult<()> {
    if !*config.global.telemetry_enabled() {
        return Ok(());
    }
    init_tracing(config.global.log_level())
}
