//! # Logging Bootstrap
//!
//! Structured logging via `tracing` with `tracing-subscriber`. Supports a
//! pretty console format for interactive use and JSON for log shipping;
//! the `RUST_LOG` environment variable overrides the configured default
//! filter.

use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

/// Output format for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub default_filter: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_filter: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl LoggingConfig {
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_filter = filter.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

/// Initialize the global tracing subscriber.
///
/// Call once at process startup. Returns an error when a global
/// subscriber was already installed.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let result = match config.format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init(),
    };

    result.map_err(|e| Error::Internal(format!("failed to install tracing subscriber: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent_failure() {
        // First call may or may not win the global slot depending on test
        // ordering; the second is guaranteed to fail without panicking.
        let _ = init_logging(LoggingConfig::default());
        assert!(init_logging(LoggingConfig::default()).is_err());
    }

    #[test]
    fn test_config_builders() {
        let config = LoggingConfig::default()
            .with_filter("debug,core_scan=trace")
            .with_format(LogFormat::Json);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.default_filter, "debug,core_scan=trace");
    }
}
