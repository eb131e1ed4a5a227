//! # Message Properties
//!
//! Metadata carried alongside a message body: the correlation id linking a
//! request to its reply, and the queue the reply should be published to.
//! Bodies themselves are opaque bytes; the bridge only interprets them at the
//! gateway boundary.

use serde::{Deserialize, Serialize};

/// Broker message properties for the request/response exchange.
///
/// Mirrors the broker-level `correlationId` / `replyTo` publish properties.
/// Both fields are optional at the wire level; the bridge fills both on
/// requests and echoes the correlation id on replies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageProperties {
    /// Opaque token linking a published request to its eventual reply.
    pub correlation_id: Option<String>,

    /// Queue name the consumer should publish its reply to.
    pub reply_to: Option<String>,
}

impl MessageProperties {
    /// Properties for an outgoing request: correlation id plus reply queue.
    pub fn for_request(correlation_id: impl Into<String>, reply_to: impl Into<String>) -> Self {
        Self {
            correlation_id: Some(correlation_id.into()),
            reply_to: Some(reply_to.into()),
        }
    }

    /// Properties for a reply: the request's correlation id echoed back.
    pub fn for_reply(correlation_id: impl Into<String>) -> Self {
        Self {
            correlation_id: Some(correlation_id.into()),
            reply_to: None,
        }
    }
}
