//! # Reply Worker
//!
//! The consumer side of the bridge: takes requests off a request queue, runs
//! a handler over the decoded payload, and publishes the handler's reply to
//! the queue named in `reply_to`, echoing the request's correlation id.
//!
//! Requests are manually acknowledged only after the reply has been
//! published; a failed publish requeues the request for redelivery.

use bytes::Bytes;
use shared_broker::{BrokerChannel, BrokerConnection, Delivery};
use shared_types::{BridgeError, MessageProperties, QueuePair};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Handler invoked for each decoded request payload.
pub type ReplyHandler =
    std::sync::Arc<dyn Fn(serde_json::Value) -> serde_json::Value + Send + Sync>;

/// A running consumer for one logical channel prefix.
pub struct ReplyWorker {
    prefix: String,
    handle: JoinHandle<()>,
}

impl ReplyWorker {
    /// Declare the prefix's queue pair and start consuming its request queue.
    ///
    /// The worker stops when `shutdown` flips to `true` or the broker ends
    /// the subscription.
    pub async fn start(
        connection: &dyn BrokerConnection,
        prefix: &str,
        handler: ReplyHandler,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<Self, BridgeError> {
        let queues = QueuePair::for_prefix(prefix)?;
        let channel = connection
            .open_channel()
            .await
            .map_err(|e| BridgeError::BrokerUnavailable(e.to_string()))?;

        for queue in [queues.request_queue(), queues.response_queue()] {
            channel
                .declare_queue(queue, true)
                .await
                .map_err(|e| BridgeError::ChannelSetup(e.to_string()))?;
        }

        let mut stream = channel
            .consume(queues.request_queue())
            .await
            .map_err(|e| BridgeError::ChannelSetup(e.to_string()))?;

        let worker_prefix = prefix.to_string();
        let handle = tokio::spawn(async move {
            info!(prefix = %worker_prefix, "Reply worker started");
            loop {
                tokio::select! {
                    delivery = stream.recv() => {
                        let Some(delivery) = delivery else { break };
                        serve(channel.as_ref(), delivery, &handler).await;
                    }
                    _ = shutdown.changed() => {
                        if *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
            if let Err(error) = channel.close().await {
                debug!(error = %error, "Worker channel close reported an error");
            }
            info!(prefix = %worker_prefix, "Reply worker stopped");
        });

        Ok(Self {
            prefix: prefix.to_string(),
            handle,
        })
    }

    /// The logical channel prefix this worker serves.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Stop the worker without waiting for the shutdown signal.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

/// Handle one request delivery end to end.
async fn serve(channel: &dyn BrokerChannel, delivery: Delivery, handler: &ReplyHandler) {
    let properties = delivery.properties.clone();

    let Some(reply_to) = properties.reply_to else {
        warn!("Request without reply_to dropped");
        delivery.reject(false);
        return;
    };

    let request: serde_json::Value = match serde_json::from_slice(&delivery.body) {
        Ok(value) => value,
        Err(error) => {
            warn!(error = %error, "Undecodable request dropped");
            delivery.reject(false);
            return;
        }
    };

    debug!(
        correlation_id = ?properties.correlation_id,
        reply_to = %reply_to,
        "Request received"
    );

    let reply = handler(request);
    let body = match serde_json::to_vec(&reply) {
        Ok(bytes) => Bytes::from(bytes),
        Err(error) => {
            warn!(error = %error, "Reply serialization failed, request dropped");
            delivery.reject(false);
            return;
        }
    };

    let reply_properties = MessageProperties {
        correlation_id: properties.correlation_id,
        reply_to: None,
    };

    // Ack only after the reply is out; a failed publish puts the request
    // back for redelivery.
    match channel.publish(&reply_to, body, reply_properties).await {
        Ok(()) => delivery.ack(),
        Err(error) => {
            warn!(error = %error, "Reply publish failed, requeueing request");
            delivery.reject(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_broker::{BrokerEndpoint, InMemoryBroker};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_worker_replies_with_correlation_id() {
        let broker = InMemoryBroker::new();
        let connection = broker.connect("amqp://localhost").await.unwrap();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let worker = ReplyWorker::start(
            connection.as_ref(),
            "demo",
            Arc::new(|_| serde_json::json!({ "prediction": "ok" })),
            shutdown_rx,
        )
        .await
        .unwrap();
        assert_eq!(worker.prefix(), "demo");

        let channel = connection.open_channel().await.unwrap();
        channel
            .publish(
                "demo_request_queue",
                Bytes::from_static(b"{\"value\":\"hello\"}"),
                MessageProperties::for_request("c1", "demo_response_queue"),
            )
            .await
            .unwrap();

        let mut replies = channel.consume("demo_response_queue").await.unwrap();
        let reply = timeout(Duration::from_millis(500), replies.recv())
            .await
            .expect("timeout")
            .expect("reply");

        assert_eq!(reply.properties.correlation_id.as_deref(), Some("c1"));
        assert_eq!(reply.body.as_ref(), b"{\"prediction\":\"ok\"}");
        reply.ack();
        worker.abort();
    }

    #[tokio::test]
    async fn test_worker_stops_on_shutdown_signal() {
        let broker = InMemoryBroker::new();
        let connection = broker.connect("amqp://localhost").await.unwrap();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let worker = ReplyWorker::start(
            connection.as_ref(),
            "demo",
            Arc::new(|request| request),
            shutdown_rx,
        )
        .await
        .unwrap();

        shutdown_tx.send(true).unwrap();
        timeout(Duration::from_millis(500), worker.handle)
            .await
            .expect("worker did not stop")
            .expect("worker task failed");
    }

    #[tokio::test]
    async fn test_request_without_reply_to_is_dropped() {
        let broker = InMemoryBroker::new();
        let connection = broker.connect("amqp://localhost").await.unwrap();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let _worker = ReplyWorker::start(
            connection.as_ref(),
            "demo",
            Arc::new(|request| request),
            shutdown_rx,
        )
        .await
        .unwrap();

        let channel = connection.open_channel().await.unwrap();
        channel
            .publish(
                "demo_request_queue",
                Bytes::from_static(b"{}"),
                MessageProperties::for_reply("c1"),
            )
            .await
            .unwrap();

        // Dropped, not requeued: the queue drains without a reply appearing.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(broker.queue_depth("demo_request_queue"), Some(0));
        assert_eq!(broker.queue_depth("demo_response_queue"), Some(0));
    }
}
