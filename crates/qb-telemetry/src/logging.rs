//! Structured logging setup.
//!
//! Installs a `tracing-subscriber` fmt layer with an env-filter. JSON output
//! keeps the fields machine-parseable for log shipping; the plain formatter
//! is for development consoles.

use crate::{TelemetryConfig, TelemetryError};
use tracing_subscriber::EnvFilter;

/// Guard returned by logging initialization.
///
/// Nothing to flush today; the guard exists so the call sites read the same
/// whether or not a buffered writer is ever added.
pub struct LoggingGuard {
    _installed: bool,
}

/// Install the global log subscriber.
///
/// # Errors
///
/// - `TelemetryError::Config` if the level filter cannot be parsed.
/// - `TelemetryError::Init` if a global subscriber is already installed.
pub fn init_logging(config: &TelemetryConfig) -> Result<LoggingGuard, TelemetryError> {
    if !config.console_output {
        // No console sink requested; leave the default (no-op) subscriber.
        return Ok(LoggingGuard { _installed: false });
    }

    let filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::Config(format!("bad log level filter: {e}")))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = if config.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| TelemetryError::Init(e.to_string()))?;

    tracing::debug!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Logging initialized"
    );
    Ok(LoggingGuard { _installed: true })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_disabled_skips_install() {
        let config = TelemetryConfig {
            console_output: false,
            ..TelemetryConfig::default()
        };
        assert!(init_logging(&config).is_ok());
    }

    #[test]
    fn test_bad_filter_is_config_error() {
        let config = TelemetryConfig {
            log_level: "not[a(filter".to_string(),
            ..TelemetryConfig::default()
        };
        let result = init_logging(&config);
        assert!(matches!(result.err(), Some(TelemetryError::Config(_))));
    }
}
