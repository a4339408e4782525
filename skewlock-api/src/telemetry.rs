//! Telemetry - Tracing Bootstrap
//!
//! Structured logging via `tracing` with an env-filterable subscriber.
//! Initialized once at startup; the middleware and handlers emit spans and
//! events through the `tracing` macros.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Telemetry configuration from environment variables.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name reported in startup logs.
    pub service_name: String,
    /// Log filter directive (falls back to `RUST_LOG`, then the default).
    pub log_filter: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: std::env::var("SKEWLOCK_SERVICE_NAME")
                .unwrap_or_else(|_| "skewlock-api".to_string()),
            log_filter: std::env::var("SKEWLOCK_LOG")
                .or_else(|_| std::env::var("RUST_LOG"))
                .unwrap_or_else(|_| "skewlock_api=info,skewlock_core=info,tower_http=info".to_string()),
        }
    }
}

/// Initialize the tracing subscriber.
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_tracing(config: &TelemetryConfig) {
    let filter =
        EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
