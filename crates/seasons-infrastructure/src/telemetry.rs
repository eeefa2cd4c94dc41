//! Tracing subscriber setup.

use seasons_core::config::LoggingSettings;
use seasons_core::error::{Result, SeasonsError};
use tracing_subscriber::EnvFilter;

/// Builds the log filter: `RUST_LOG` wins over the configured level.
pub fn build_filter(settings: &LoggingSettings) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|e| {
            SeasonsError::config(format!("invalid log level '{}': {}", settings.level, e))
        })
}

/// Installs the global fmt subscriber.
///
/// # Errors
///
/// `Config` for an unparsable level, `Internal` if a subscriber is
/// already installed.
pub fn init_tracing(settings: &LoggingSettings) -> Result<()> {
    let filter = build_filter(settings)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| SeasonsError::internal(format!("tracing already initialized: {}", e)))
}
