//! # Queue-Bridge Telemetry
//!
//! Logging bootstrap for the bridge runtime: configuration from environment
//! variables and `tracing-subscriber` initialization.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `QB_SERVICE_NAME` | `queue-bridge` | Service name recorded in logs |
//! | `QB_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `QB_CONSOLE_OUTPUT` | `true` | Emit logs to the console |
//! | `QB_JSON_LOGS` | `false` (true in containers) | JSON-formatted logs |

pub mod config;
pub mod logging;

pub use config::TelemetryConfig;
pub use logging::LoggingGuard;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to install log subscriber: {0}")]
    Init(String),
}

/// Initialize logging for the process.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<LoggingGuard, TelemetryError> {
    logging::init_logging(config)
}
