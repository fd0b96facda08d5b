// Logging setup
//
// Console logging through tracing-subscriber. RUST_LOG (or LOG_LEVEL)
// overrides the default filter; LOG_FORMAT=json switches to JSON lines.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LogFormat;

pub const DEFAULT_LOG_FILTER: &str =
    "estatehub_api=debug,estatehub_core=debug,estatehub_storage=debug,tower_http=debug";

/// Configuration for logging
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Log filter (e.g., "info", "estatehub_core=debug")
    pub log_filter: Option<String>,
    pub format: LogFormat,
}

impl TelemetryConfig {
    pub fn from_env(format: LogFormat) -> Self {
        Self {
            log_filter: std::env::var("RUST_LOG")
                .ok()
                .or_else(|| std::env::var("LOG_LEVEL").ok()),
            format,
        }
    }

    fn filter(&self) -> EnvFilter {
        self.log_filter
            .as_ref()
            .and_then(|f| EnvFilter::try_new(f).ok())
            .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
    }
}

/// Install the global subscriber. Call once, at startup.
pub fn init_telemetry(config: TelemetryConfig) {
    let filter = config.filter();

    let layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_filter(filter)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_filter(filter)
            .boxed(),
    };

    tracing_subscriber::registry().with(layer).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_falls_back_to_default() {
        let config = TelemetryConfig {
            log_filter: Some("estatehub_core=notalevel".to_string()),
            format: LogFormat::Pretty,
        };
        assert_eq!(config.filter().to_string(), EnvFilter::new(DEFAULT_LOG_FILTER).to_string());
    }
}
