use anyhow::Result;
use std::io;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingSettings;

/// Install the global subscriber. Output goes to stderr so command output on
/// stdout stays clean; `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(settings: &LoggingSettings) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));

    if settings.json {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .json()
                    .with_writer(io::stderr)
                    .with_filter(env_filter),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(io::stderr)
                    .with_filter(env_filter),
            )
            .try_init()?;
    }

    tracing::debug!(level = %settings.level, json = settings.json, "logging initialized");
    Ok(())
}
