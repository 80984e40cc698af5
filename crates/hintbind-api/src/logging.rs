//! Logging setup
//!
//! Installs a `tracing` subscriber for binaries and tests that want to see
//! binding diagnostics. Libraries only emit events; call `init_logging` once
//! at startup.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub default_filter: String,

    /// Enable structured JSON logging
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_filter: "info".to_string(),
            json: false,
        }
    }
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fallback filter directive
    pub fn default_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_filter = filter.into();
        self
    }

    /// Switch to JSON output
    pub fn json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}

/// Initialize the global subscriber
///
/// Fails if the filter directive is invalid or a global subscriber is
/// already installed.
///
/// # Example
/// ```no_run
/// use hintbind_api::logging::{init_logging, LoggingConfig};
///
/// init_logging(LoggingConfig::default().default_filter("hintbind_api=debug"))
///     .expect("Failed to initialize logging");
/// ```
pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.default_filter)?,
    };

    if config.json {
        // JSON structured logging for production
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    } else {
        // Human-readable logging for development
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    tracing::info!(
        filter = %config.default_filter,
        json = config.json,
        "Logging initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = LoggingConfig::new().default_filter("debug").json(true);
        assert_eq!(config.default_filter, "debug");
        assert!(config.json);
    }

    #[test]
    fn test_invalid_filter_is_an_error() {
        std::env::remove_var("RUST_LOG");
        let result = init_logging(LoggingConfig::new().default_filter("hintbind=notalevel"));
        assert!(result.is_err());
    }
}
