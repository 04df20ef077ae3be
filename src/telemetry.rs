use anyhow::{anyhow, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

/// Install the structured JSON subscriber. Logs go to stderr so event output
/// on stdout stays machine readable. `RUST_LOG` overrides `default_level`.
pub fn init_telemetry(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("Invalid log level '{}': {}", default_level, e))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::debug!("Tourguide telemetry initialized");
    Ok(())
}

/// Span wrapping one controller entry point.
pub fn create_tour_span(operation: &str, run_id: Option<Uuid>, index: Option<usize>) -> tracing::Span {
    tracing::info_span!(
        "tour",
        operation = operation,
        run.id = run_id.map(tracing::field::display),
        step.index = index,
    )
}

pub fn shutdown_telemetry() {
    tracing::debug!("Tourguide telemetry shutdown complete");
}

