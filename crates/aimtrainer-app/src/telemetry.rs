//! Logging bootstrap for the headless driver.

use anyhow::{Context, Result};

/// Install a stderr `fmt` subscriber. `RUST_LOG` wins over `level` when set.
pub fn init(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .context("installing tracing subscriber")?;

    tracing::debug!(target: "telemetry", level, "logging initialized");
    Ok(())
}
