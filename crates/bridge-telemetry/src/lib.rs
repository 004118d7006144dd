//! Logging for the ASR bridge
//!
//! Structured `tracing` output to stdout, as text or JSON lines

use bridge_config::{LogFormat, TelemetryConfig};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when the configured directive does not parse
const FALLBACK_FILTER: &str = "info";

/// Install the global subscriber
///
/// `log_filter` takes `EnvFilter` directives such as `info` or
/// `stt=debug,tower_http=info`.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init(config: &TelemetryConfig, log_filter: &str) -> anyhow::Result<()> {
    let (filter, invalid) = match EnvFilter::try_new(log_filter) {
        Ok(filter) => (filter, false),
        Err(_) => (EnvFilter::new(FALLBACK_FILTER), true),
    };

    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_target(true),
            )
            .try_init(),
    }
    .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))?;

    if invalid {
        tracing::warn!(log_filter, fallback = FALLBACK_FILTER, "invalid log filter, using fallback");
    }

    Ok(())
}
