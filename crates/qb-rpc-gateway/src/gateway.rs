//! # RPC Gateway
//!
//! The synchronous-looking call facade over the asynchronous channel.

use crate::channel::RpcChannel;
use crate::config::DEFAULT_CALL_TIMEOUT;
use crate::correlation::{CorrelationId, CorrelationIdGenerator};
use crate::pending::{PendingCallStore, PendingStats};
use bytes::Bytes;
use shared_broker::BrokerConnection;
use shared_types::BridgeError;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Public entry point of the bridge.
///
/// Every call gets its own correlation id and its own broker channel; the
/// channel is closed when the exchange settles, so consumers never leak
/// across unrelated calls. All callers share one [`PendingCallStore`], which
/// is what keeps concurrently interleaved replies from cross-talking: a reply
/// reaches its caller by id no matter which call's consumer received it.
pub struct RpcGateway {
    connection: Arc<dyn BrokerConnection>,
    registry: Arc<PendingCallStore>,
    ids: CorrelationIdGenerator,
    default_timeout: Duration,
}

impl RpcGateway {
    /// Create a gateway over an established broker connection.
    #[must_use]
    pub fn new(connection: Arc<dyn BrokerConnection>) -> Self {
        Self::with_timeout(connection, DEFAULT_CALL_TIMEOUT)
    }

    /// Create a gateway with a non-default reply deadline.
    #[must_use]
    pub fn with_timeout(connection: Arc<dyn BrokerConnection>, default_timeout: Duration) -> Self {
        Self {
            connection,
            registry: Arc::new(PendingCallStore::new()),
            ids: CorrelationIdGenerator::new(),
            default_timeout,
        }
    }

    /// Issue one request/response exchange on the logical channel `prefix`.
    ///
    /// Publishes `payload` to `<prefix>_request_queue` and resolves with the
    /// parsed reply from `<prefix>_response_queue`. Exactly one of success,
    /// error, or timeout is returned per call.
    ///
    /// # Errors
    ///
    /// - `ChannelSetup` / `BrokerUnavailable`: the channel could not be set up.
    /// - `Publish`: the broker refused the request.
    /// - `Timeout`: no matching reply within the deadline; a later reply is
    ///   dropped without effect.
    /// - `EmptyReply`: the reply body was zero-length.
    /// - `MalformedResponse`: the reply body was not valid JSON.
    pub async fn call(
        &self,
        prefix: &str,
        payload: &serde_json::Value,
        call_timeout: Option<Duration>,
    ) -> Result<serde_json::Value, BridgeError> {
        let deadline = call_timeout.unwrap_or(self.default_timeout);
        let correlation_id = self.ids.next_id();
        debug!(correlation_id = %correlation_id, prefix = prefix, "Call started");

        let channel = RpcChannel::open(self.connection.as_ref(), prefix).await?;
        let result = self
            .exchange(&channel, &correlation_id, payload, deadline)
            .await;

        // One-shot channel-per-call policy: released on success and failure
        // alike.
        channel.close().await;

        match &result {
            Ok(_) => debug!(correlation_id = %correlation_id, "Call succeeded"),
            Err(error) => debug!(correlation_id = %correlation_id, error = %error, "Call failed"),
        }
        result
    }

    async fn exchange(
        &self,
        channel: &RpcChannel,
        correlation_id: &CorrelationId,
        payload: &serde_json::Value,
        deadline: Duration,
    ) -> Result<serde_json::Value, BridgeError> {
        let receiver = self.registry.register(correlation_id)?;

        // The consumer must be live before the request goes out; publishing
        // first would race a fast reply against subscription setup.
        if let Err(error) = channel.subscribe_replies(Arc::clone(&self.registry)).await {
            self.registry.cancel(correlation_id);
            return Err(error);
        }

        let body = match serde_json::to_vec(payload) {
            Ok(bytes) => Bytes::from(bytes),
            Err(error) => {
                self.registry.cancel(correlation_id);
                return Err(BridgeError::Publish(format!(
                    "payload serialization failed: {error}"
                )));
            }
        };

        if let Err(error) = channel.publish_request(body, correlation_id).await {
            self.registry.cancel(correlation_id);
            return Err(error);
        }

        match timeout(deadline, receiver).await {
            Ok(Ok(reply)) => parse_reply(reply?),
            Ok(Err(_)) => {
                // Sender vanished without settling the call; the registry
                // entry is already gone.
                self.registry.cancel(correlation_id);
                Err(BridgeError::BrokerUnavailable(
                    "reply channel closed before a response arrived".to_string(),
                ))
            }
            Err(_) => {
                self.registry.expire(correlation_id);
                Err(BridgeError::Timeout {
                    correlation_id: correlation_id.to_string(),
                    waited_ms: deadline.as_millis() as u64,
                })
            }
        }
    }

    /// Calls currently awaiting replies.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.registry.pending_count()
    }

    /// Lifecycle counters of the shared registry.
    #[must_use]
    pub fn stats(&self) -> Arc<PendingStats> {
        self.registry.stats()
    }
}

/// Interpret a raw reply body as structured data.
fn parse_reply(body: Bytes) -> Result<serde_json::Value, BridgeError> {
    if body.is_empty() {
        return Err(BridgeError::EmptyReply);
    }
    serde_json::from_slice(&body).map_err(|e| BridgeError::MalformedResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reply_empty_body() {
        assert_eq!(parse_reply(Bytes::new()), Err(BridgeError::EmptyReply));
    }

    #[test]
    fn test_parse_reply_malformed_body() {
        let result = parse_reply(Bytes::from_static(b"not json"));
        assert!(matches!(result, Err(BridgeError::MalformedResponse(_))));
    }

    #[test]
    fn test_parse_reply_valid_json() {
        let value = parse_reply(Bytes::from_static(b"{\"prediction\":\"ok\"}")).unwrap();
        assert_eq!(value["prediction"], "ok");
    }
}
