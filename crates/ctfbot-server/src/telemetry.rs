// Logging setup
//
// Console logging through tracing-subscriber, filtered by RUST_LOG or
// LOG_LEVEL.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const DEFAULT_LOG_FILTER: &str = "ctfbot=info,ctfbot_core=info,ctfbot_server=info,tower_http=info";

/// Configuration for logging
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub service_version: Option<String>,
    /// Log filter (e.g., "info", "ctfbot_core=debug")
    pub log_filter: Option<String>,
    /// Include the event target in each line
    pub with_target: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "ctfbot".to_string(),
            service_version: None,
            log_filter: None,
            with_target: true,
        }
    }
}

impl TelemetryConfig {
    /// Environment variables:
    /// - `RUST_LOG` or `LOG_LEVEL`: Log filter
    pub fn from_env() -> Self {
        Self {
            log_filter: std::env::var("RUST_LOG")
                .ok()
                .or_else(|| std::env::var("LOG_LEVEL").ok()),
            ..Self::default()
        }
    }

    fn filter(&self) -> EnvFilter {
        self.log_filter
            .as_ref()
            .and_then(|f| EnvFilter::try_new(f).ok())
            .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
    }
}

/// Install the global subscriber
pub fn init_telemetry(config: TelemetryConfig) {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(config.with_target)
        .with_filter(config.filter());

    tracing_subscriber::registry().with(console_layer).init();

    tracing::debug!(
        service = %config.service_name,
        version = config.service_version.as_deref().unwrap_or("unknown"),
        "Logging initialized"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_filter_is_used() {
        let config = TelemetryConfig {
            log_filter: Some("debug".to_string()),
            ..TelemetryConfig::default()
        };
        assert_eq!(config.filter().to_string(), "debug");
    }

    #[test]
    fn test_default_has_no_filter() {
        let config = TelemetryConfig::default();
        assert!(config.log_filter.is_none());
        assert_eq!(config.service_name, "ctfbot");
    }
}
