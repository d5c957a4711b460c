//! Tracing subscriber initialization.

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured log level when set. With
/// `json_logs` enabled every event is written as one JSON object per line.
///
/// # Errors
///
/// Returns an error if the filter directive is invalid or a global subscriber
/// has already been set.
pub fn init_tracing(config: &AppConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.server.log_level)?,
    };

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.features.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()?;
    }

    Ok(())
}
