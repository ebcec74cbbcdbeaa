//! Logging setup for sqlmerge.
//!
//! The library itself only emits `tracing` events. This module installs a
//! subscriber for applications that do not bring their own.
//!
//! # Environment Variables
//!
//! - `SQLMERGE_DEBUG=true|1|yes` - Enable debug logging
//! - `SQLMERGE_LOG_LEVEL=trace|debug|info|warn|error` - Set specific log level
//! - `SQLMERGE_LOG_FORMAT=json|pretty|compact` - Set output format (default: json)
//!
//! ```rust,no_run
//! use sqlmerge_query::logging;
//!
//! // Call once at startup.
//! logging::init();
//! ```

use std::env;
use std::sync::Once;

use crate::config::{LogFormat, LoggingConfig};

static INIT: Once = Once::new();

/// Check if debug logging is enabled via `SQLMERGE_DEBUG`.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("SQLMERGE_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Get the configured log level from `SQLMERGE_LOG_LEVEL`.
///
/// Defaults to "debug" if `SQLMERGE_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    let fallback = if is_debug_enabled() { "debug" } else { "warn" };
    match env::var("SQLMERGE_LOG_LEVEL") {
        Ok(level) => match level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" => "warn",
            "error" => "error",
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

/// Get the configured log format from `SQLMERGE_LOG_FORMAT`.
pub fn get_log_format() -> LogFormat {
    env::var("SQLMERGE_LOG_FORMAT")
        .ok()
        .and_then(|f| f.parse().ok())
        .unwrap_or_default()
}

/// Initialize logging from the environment.
///
/// Does nothing unless `SQLMERGE_DEBUG` or `SQLMERGE_LOG_LEVEL` is set.
/// Subsequent calls are no-ops.
pub fn init() {
    if !is_debug_enabled() && env::var("SQLMERGE_LOG_LEVEL").is_err() {
        return;
    }
    install(get_log_level(), get_log_format());
}

/// Initialize logging from a loaded configuration.
pub fn init_from_config(config: &LoggingConfig) {
    install(&config.level, config.format);
}

fn install(level: &str, format: LogFormat) {
    INIT.call_once(|| {
        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let filter = EnvFilter::try_new(format!(
                "sqlmerge={},sqlmerge_query={}",
                level, level
            ))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

            let registry = tracing_subscriber::registry().with(filter);
            let installed = match format {
                LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
                LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
                LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
            };

            if installed.is_ok() {
                tracing::info!(level, format = format.as_str(), "sqlmerge logging initialized");
            }
        }

        #[cfg(not(feature = "tracing-subscriber"))]
        {
            let _ = (level, format);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parse_fallback() {
        assert_eq!("PRETTY".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_init_from_config_is_idempotent() {
        let config = LoggingConfig::default();
        init_from_config(&config);
        init_from_config(&config);
    }
}
