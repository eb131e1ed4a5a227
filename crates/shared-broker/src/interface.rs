//! # Broker Interface
//!
//! Trait boundary between the bridge and the broker, plus the manual-ack
//! delivery handle consumers receive.

use crate::error::BrokerError;
use async_trait::async_trait;
use bytes::Bytes;
use shared_types::MessageProperties;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, oneshot};
use tokio_stream::Stream;

/// Entry point to a broker: resolves a URL into a live connection.
#[async_trait]
pub trait BrokerEndpoint: Send + Sync {
    /// Connect to the broker at `url`.
    async fn connect(&self, url: &str) -> Result<Arc<dyn BrokerConnection>, BrokerError>;
}

/// A live broker connection. Channels are multiplexed over it.
#[async_trait]
pub trait BrokerConnection: Send + Sync {
    /// Open a new channel on this connection.
    async fn open_channel(&self) -> Result<Box<dyn BrokerChannel>, BrokerError>;

    /// Close the connection. Idempotent.
    async fn close(&self) -> Result<(), BrokerError>;

    /// Whether the connection has been closed.
    fn is_closed(&self) -> bool;
}

/// A broker channel: queue declaration, publishing, and consuming.
#[async_trait]
pub trait BrokerChannel: Send + Sync {
    /// Assert that `queue` exists with the given durability, creating it if
    /// necessary. Redeclaring with different durability is an error.
    async fn declare_queue(&self, queue: &str, durable: bool) -> Result<(), BrokerError>;

    /// Passive inspection of a declared queue.
    async fn queue_status(&self, queue: &str) -> Result<QueueStatus, BrokerError>;

    /// Publish `body` to `queue` with the given properties.
    async fn publish(
        &self,
        queue: &str,
        body: Bytes,
        properties: MessageProperties,
    ) -> Result<(), BrokerError>;

    /// Begin consuming `queue` with manual acknowledgment. The returned
    /// stream yields deliveries until the channel is closed or the stream is
    /// dropped.
    async fn consume(&self, queue: &str) -> Result<DeliveryStream, BrokerError>;

    /// Close the channel, stopping its consumers. Idempotent.
    async fn close(&self) -> Result<(), BrokerError>;

    /// Whether the channel has been closed.
    fn is_closed(&self) -> bool;
}

/// Snapshot of a queue's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStatus {
    /// Messages currently waiting in the queue.
    pub message_count: usize,
    /// Active consumers on the queue.
    pub consumer_count: usize,
}

/// Consumer's verdict on a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckDisposition {
    /// Processing complete; discard the message.
    Ack,
    /// Processing refused; optionally return the message to the queue.
    Reject { requeue: bool },
}

/// One consumed message awaiting a disposition.
///
/// The consumer must call [`Delivery::ack`] or [`Delivery::reject`]. A
/// delivery dropped without a disposition counts as unacknowledged and is
/// returned to its queue.
#[derive(Debug)]
pub struct Delivery {
    /// Opaque message body.
    pub body: Bytes,
    /// Correlation metadata the message was published with.
    pub properties: MessageProperties,
    disposition: Option<oneshot::Sender<AckDisposition>>,
}

impl Delivery {
    /// Create a delivery and the receiver its disposition will arrive on.
    /// Used by broker implementations.
    #[must_use]
    pub fn new(
        body: Bytes,
        properties: MessageProperties,
    ) -> (Self, oneshot::Receiver<AckDisposition>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                body,
                properties,
                disposition: Some(tx),
            },
            rx,
        )
    }

    /// Acknowledge the message.
    pub fn ack(mut self) {
        self.settle(AckDisposition::Ack);
    }

    /// Reject the message, optionally returning it to the queue.
    pub fn reject(mut self, requeue: bool) {
        self.settle(AckDisposition::Reject { requeue });
    }

    fn settle(&mut self, disposition: AckDisposition) {
        if let Some(tx) = self.disposition.take() {
            // Receiver gone means the consumer was torn down; nothing to do.
            let _ = tx.send(disposition);
        }
    }
}

impl Drop for Delivery {
    fn drop(&mut self) {
        // Unacknowledged on drop: hand the message back to the queue.
        self.settle(AckDisposition::Reject { requeue: true });
    }
}

/// Stream of deliveries for one consumer subscription.
///
/// Ends when the channel is closed or the broker side stops the consumer.
/// Dropping the stream cancels the subscription.
#[derive(Debug)]
pub struct DeliveryStream {
    rx: mpsc::Receiver<Delivery>,
}

impl DeliveryStream {
    /// Wrap a receiver produced by a broker implementation.
    #[must_use]
    pub fn new(rx: mpsc::Receiver<Delivery>) -> Self {
        Self { rx }
    }

    /// Receive the next delivery.
    ///
    /// Returns `None` once the subscription has ended.
    pub async fn recv(&mut self) -> Option<Delivery> {
        self.rx.recv().await
    }
}

impl Stream for DeliveryStream {
    type Item = Delivery;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}
