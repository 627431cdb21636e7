//! Tracing subscriber setup for the service binary
//!
//! Library crates only emit `tracing` events; the subscriber is installed
//! once here from [`LoggingConfig`]. `RUST_LOG` overrides the configured level.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sp_shared::config::{LogFormat, LoggingConfig};

/// Install the global subscriber
///
/// # Errors
/// Fails if the level is not a valid filter directive or a subscriber is
/// already installed.
pub fn init(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = build_filter(config)?;
    let source = config.source_location;
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_file(source)
                    .with_line_number(source),
            )
            .try_init()?,
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_file(source).with_line_number(source))
            .try_init()?,
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_file(source)
                    .with_line_number(source),
            )
            .try_init()?,
    }

    Ok(())
}

fn build_filter(config: &LoggingConfig) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::try_new(&config.level)?),
    }
}
