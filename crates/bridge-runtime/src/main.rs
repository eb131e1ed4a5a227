//! # Queue-Bridge Runtime Entry Point
//!
//! Startup sequence:
//!
//! 1. Initialize logging from the environment.
//! 2. Load bridge configuration.
//! 3. Connect to the broker (fatal on failure; the bridge is useless
//!    without one).
//! 4. Start the demo reply worker and run one demo exchange.
//! 5. Wait for Ctrl+C, then shut down gracefully.

use anyhow::{Context, Result};
use bridge_runtime::BridgeRuntime;
use qb_rpc_gateway::BridgeConfig;
use qb_telemetry::{init_telemetry, TelemetryConfig};
use shared_broker::InMemoryBroker;
use std::sync::Arc;
use tracing::{info, warn};

/// Prefix served by the built-in demo worker.
const DEMO_PREFIX: &str = "demo";

/// Demo handler: acknowledges the request and echoes its `value` field.
fn demo_handler(request: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "prediction": "ok",
        "value": request.get("value").cloned().unwrap_or(serde_json::Value::Null),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry_config = TelemetryConfig::from_env();
    let _guard = init_telemetry(&telemetry_config).context("Failed to initialize logging")?;

    let config = BridgeConfig::from_env();
    info!("===========================================");
    info!("  Queue-Bridge Runtime v0.1.0");
    info!("===========================================");
    info!(broker_url = %config.broker_url, "Starting bridge runtime");

    let broker = Arc::new(InMemoryBroker::new());
    let runtime = BridgeRuntime::new(broker, config);

    let gateway = runtime
        .start()
        .await
        .context("Broker unreachable at startup")?;
    runtime
        .spawn_responder(DEMO_PREFIX, Arc::new(demo_handler))
        .await
        .context("Failed to start demo reply worker")?;

    match gateway
        .call(DEMO_PREFIX, &serde_json::json!({ "value": "hello" }), None)
        .await
    {
        Ok(reply) => info!(reply = %reply, "Demo exchange succeeded"),
        Err(error) => warn!(error = %error, "Demo exchange failed"),
    }

    info!("Bridge is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    runtime.shutdown().await;
    Ok(())
}
