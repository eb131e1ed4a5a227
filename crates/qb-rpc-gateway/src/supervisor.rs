//! # Connection Supervisor
//!
//! Owns the process's single broker connection: establishes it at startup
//! with bounded retry, closes it exactly once at shutdown.

use crate::config::BridgeConfig;
use shared_broker::{BrokerConnection, BrokerEndpoint};
use shared_types::BridgeError;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Supervisor for the shared broker connection.
///
/// `start` is called once at process startup; its failure is fatal to the
/// process (the bridge is useless without a broker). `shutdown` is wired to
/// termination signals and may be called any number of times.
pub struct ConnectionSupervisor {
    endpoint: Arc<dyn BrokerEndpoint>,
    config: BridgeConfig,
    connection: Mutex<Option<Arc<dyn BrokerConnection>>>,
}

impl ConnectionSupervisor {
    /// Create a supervisor for the given endpoint and configuration.
    #[must_use]
    pub fn new(endpoint: Arc<dyn BrokerEndpoint>, config: BridgeConfig) -> Self {
        Self {
            endpoint,
            config,
            connection: Mutex::new(None),
        }
    }

    /// Establish the broker connection, retrying with linear backoff.
    ///
    /// # Errors
    ///
    /// `BridgeError::BrokerUnavailable` once all attempts are exhausted or
    /// the configured URL is empty.
    pub async fn start(&self) -> Result<Arc<dyn BrokerConnection>, BridgeError> {
        if self.config.broker_url.trim().is_empty() {
            return Err(BridgeError::BrokerUnavailable(
                "broker url must not be empty".to_string(),
            ));
        }

        let attempts = self.config.connect_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            match self.endpoint.connect(&self.config.broker_url).await {
                Ok(connection) => {
                    info!(attempt = attempt, "Broker connection established");
                    *self.connection.lock().await = Some(Arc::clone(&connection));
                    return Ok(connection);
                }
                Err(error) => {
                    warn!(
                        attempt = attempt,
                        attempts = attempts,
                        error = %error,
                        "Broker connection attempt failed"
                    );
                    last_error = Some(error);
                    if attempt < attempts {
                        tokio::time::sleep(self.config.connect_backoff * attempt).await;
                    }
                }
            }
        }

        Err(BridgeError::BrokerUnavailable(
            last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no connection attempts made".to_string()),
        ))
    }

    /// The current connection, if one has been established.
    pub async fn connection(&self) -> Option<Arc<dyn BrokerConnection>> {
        self.connection.lock().await.clone()
    }

    /// Close the shared connection. Idempotent; later calls are no-ops.
    pub async fn shutdown(&self) {
        let Some(connection) = self.connection.lock().await.take() else {
            return;
        };
        if let Err(error) = connection.close().await {
            warn!(error = %error, "Broker connection close reported an error");
        }
        info!("Broker connection closed");
    }
}
