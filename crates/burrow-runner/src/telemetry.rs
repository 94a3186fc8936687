//! Log subscriber setup for the runner.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` overrides the default filter and
/// `BURROW_LOG_JSON=1` switches to JSON lines.
pub fn init_telemetry() -> Result<()> {
    let json = std::env::var("BURROW_LOG_JSON")
        .map(|v| v == "1")
        .unwrap_or(false);

    let (plain, structured) = if json {
        (None, Some(fmt::layer().json().with_target(true)))
    } else {
        (Some(fmt::layer().with_target(true)), None)
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,burrow_world=debug".into());

    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(structured)
        .try_init()?;

    info!(json, "Telemetry initialized");
    Ok(())
}
