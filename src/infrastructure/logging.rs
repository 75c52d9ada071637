//! Global `tracing` subscriber setup
//!
//! The server logs to stdout (pretty for humans, JSON for collectors). The
//! one-shot `parse` command keeps stdout for the rendered document and logs
//! compact lines to stderr.

use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

use crate::config::{LogFormat, LoggingConfig};

/// Install the global subscriber; `RUST_LOG` wins over the configured level.
///
/// Fails when a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()?,
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_span_events(FmtSpan::CLOSE))
            .try_init()?,
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
    }

    tracing::debug!(level = %config.level, format = ?config.format, "Logging initialized");
    Ok(())
}
