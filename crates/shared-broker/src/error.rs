//! # Broker Errors
//!
//! Transport-level faults from the broker boundary. The gateway maps these
//! into the caller-visible `BridgeError` taxonomy.

use thiserror::Error;

/// Errors from broker connection, channel, and consumer operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BrokerError {
    /// The broker refused the connection (unreachable, bad URL).
    #[error("Connection refused: {0}")]
    ConnectionRefused(String),

    /// The connection has been closed; no further channels can be opened.
    #[error("Connection closed")]
    ConnectionClosed,

    /// The channel has been closed; no further operations are possible.
    #[error("Channel closed")]
    ChannelClosed,

    /// The target queue has not been declared.
    #[error("Queue not declared: {0}")]
    QueueMissing(String),

    /// A queue was redeclared with different durability.
    #[error("Queue {0} redeclared with different durability")]
    DeclareMismatch(String),
}
