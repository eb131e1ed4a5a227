//! # Error Types
//!
//! The caller-visible error taxonomy for bridge calls. Every per-call failure
//! is mapped into one of these variants at the gateway boundary; only a
//! startup-time broker connection failure is fatal to the process.

use thiserror::Error;

/// Errors surfaced to callers of the RPC bridge.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BridgeError {
    /// A correlation id was registered twice. Programmer error; the id
    /// generator guarantees uniqueness per outstanding call.
    #[error("Duplicate correlation id: {0}")]
    DuplicateCorrelationId(String),

    /// Channel creation or queue assertion failed. The call is aborted, not
    /// retried.
    #[error("Channel setup failed: {0}")]
    ChannelSetup(String),

    /// The broker rejected or failed the publish.
    #[error("Publish failed: {0}")]
    Publish(String),

    /// No matching reply arrived within the deadline.
    #[error("No reply within {waited_ms} ms for correlation id {correlation_id}")]
    Timeout {
        correlation_id: String,
        waited_ms: u64,
    },

    /// The reply arrived with a zero-length body.
    #[error("Empty reply body")]
    EmptyReply,

    /// The reply body could not be parsed as structured data.
    #[error("Malformed reply: {0}")]
    MalformedResponse(String),

    /// The broker connection is unusable. Fatal at startup, surfaced per-call
    /// afterwards.
    #[error("Broker unavailable: {0}")]
    BrokerUnavailable(String),
}
