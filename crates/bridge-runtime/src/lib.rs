//! # Queue-Bridge Runtime
//!
//! Orchestrates the pieces of the bridge for one process:
//!
//! 1. Establish the shared broker connection (supervised, bounded retry).
//! 2. Start reply workers for the prefixes this process serves.
//! 3. Hand out an [`RpcGateway`] for issuing calls.
//! 4. On shutdown, signal the workers and close the connection.
//!
//! The shutdown signal is a watch channel every worker selects on, so a
//! single `shutdown()` call stops all of them.

pub mod responder;

pub use responder::{ReplyHandler, ReplyWorker};

use parking_lot::Mutex;
use qb_rpc_gateway::{BridgeConfig, ConnectionSupervisor, RpcGateway};
use shared_broker::BrokerEndpoint;
use shared_types::BridgeError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

/// The runtime wiring for one bridge process.
pub struct BridgeRuntime {
    supervisor: ConnectionSupervisor,
    config: BridgeConfig,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    workers: Mutex<Vec<ReplyWorker>>,
}

impl BridgeRuntime {
    /// Create a runtime over a broker endpoint.
    #[must_use]
    pub fn new(endpoint: Arc<dyn BrokerEndpoint>, config: BridgeConfig) -> Self {
        let supervisor = ConnectionSupervisor::new(endpoint, config.clone());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Self {
            supervisor,
            config,
            shutdown_tx,
            shutdown_rx,
            workers: Mutex::new(Vec::new()),
        }
    }

    /// Connect to the broker and build the gateway.
    ///
    /// # Errors
    ///
    /// `BridgeError::BrokerUnavailable` if the broker cannot be reached;
    /// fatal at the binary boundary.
    pub async fn start(&self) -> Result<Arc<RpcGateway>, BridgeError> {
        let connection = self.supervisor.start().await?;
        let gateway = Arc::new(RpcGateway::with_timeout(
            connection,
            self.config.default_call_timeout,
        ));
        info!("Bridge runtime started");
        Ok(gateway)
    }

    /// Start a reply worker for `prefix`, serving requests with `handler`.
    pub async fn spawn_responder(
        &self,
        prefix: &str,
        handler: ReplyHandler,
    ) -> Result<(), BridgeError> {
        let connection = self.supervisor.connection().await.ok_or_else(|| {
            BridgeError::BrokerUnavailable("runtime not started".to_string())
        })?;

        let worker =
            ReplyWorker::start(connection.as_ref(), prefix, handler, self.shutdown_rx.clone())
                .await?;
        self.workers.lock().push(worker);
        Ok(())
    }

    /// Number of running reply workers.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers.lock().len()
    }

    /// Signal workers to stop and close the broker connection. Idempotent.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        let _ = self.shutdown_tx.send(true);

        // Give workers a beat to drain before the connection goes away.
        tokio::time::sleep(Duration::from_millis(100)).await;

        self.supervisor.shutdown().await;
        info!("Shutdown complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_broker::InMemoryBroker;

    fn test_config() -> BridgeConfig {
        BridgeConfig {
            connect_backoff: Duration::from_millis(1),
            default_call_timeout: Duration::from_secs(2),
            ..BridgeConfig::default()
        }
    }

    #[tokio::test]
    async fn test_start_serve_call_shutdown() {
        let runtime = BridgeRuntime::new(Arc::new(InMemoryBroker::new()), test_config());

        let gateway = runtime.start().await.unwrap();
        runtime
            .spawn_responder(
                "demo",
                Arc::new(|_| serde_json::json!({ "prediction": "ok" })),
            )
            .await
            .unwrap();
        assert_eq!(runtime.worker_count(), 1);

        let reply = gateway
            .call("demo", &serde_json::json!({ "value": "hello" }), None)
            .await
            .unwrap();
        assert_eq!(reply, serde_json::json!({ "prediction": "ok" }));

        runtime.shutdown().await;
        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_spawn_responder_before_start_fails() {
        let runtime = BridgeRuntime::new(Arc::new(InMemoryBroker::new()), test_config());
        let result = runtime
            .spawn_responder("demo", Arc::new(|request| request))
            .await;
        assert!(matches!(
            result.err(),
            Some(BridgeError::BrokerUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_broker_fails_start() {
        let broker = Arc::new(InMemoryBroker::new());
        broker.set_reachable(false);
        let runtime = BridgeRuntime::new(
            broker,
            BridgeConfig {
                connect_attempts: 1,
                ..test_config()
            },
        );

        assert!(matches!(
            runtime.start().await.err(),
            Some(BridgeError::BrokerUnavailable(_))
        ));
    }
}
