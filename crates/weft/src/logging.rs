//! Tracing subscriber setup.
//!
//! Library crates only emit `tracing` events; the application decides
//! where they go. [`init_tracing`] installs a single `fmt` layer filtered
//! by [`LogConfig::filter`].

use crate::config::LogConfig;
use crate::KernelError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Parses the configured filter directives.
///
/// # Errors
///
/// [`KernelError::Logging`] if the directives do not parse.
pub fn env_filter(config: &LogConfig) -> Result<EnvFilter, KernelError> {
    EnvFilter::try_new(&config.filter)
        .map_err(|e| KernelError::Logging(format!("invalid filter '{}': {e}", config.filter)))
}

/// Installs the global tracing subscriber.
///
/// # Errors
///
/// [`KernelError::Logging`] if the filter is invalid or a subscriber is
/// already installed.
pub fn init_tracing(config: &LogConfig) -> Result<(), KernelError> {
    let filter = env_filter(config)?;
    let layer = fmt::layer()
        .with_target(config.target)
        .with_ansi(config.ansi);

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .try_init()
        .map_err(|e| KernelError::Logging(e.to_string()))
}
