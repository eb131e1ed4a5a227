//! # Queue Naming
//!
//! Request and response queue names are derived deterministically from a
//! logical channel prefix. Both sides of the bridge derive the same pair, so
//! the names never travel out of band.

use crate::errors::BridgeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Suffix appended to the prefix for the request (work) queue.
pub const REQUEST_QUEUE_SUFFIX: &str = "_request_queue";

/// Suffix appended to the prefix for the response (reply) queue.
pub const RESPONSE_QUEUE_SUFFIX: &str = "_response_queue";

/// A request/response queue pair for one logical RPC channel.
///
/// Derived from a channel prefix: `<prefix>_request_queue` and
/// `<prefix>_response_queue`. Both queues are declared durable before use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueuePair {
    prefix: String,
    request_queue: String,
    response_queue: String,
}

impl QueuePair {
    /// Derive the queue pair for a channel prefix.
    ///
    /// # Errors
    ///
    /// `BridgeError::ChannelSetup` if the prefix is empty or whitespace-only.
    pub fn for_prefix(prefix: &str) -> Result<Self, BridgeError> {
        if prefix.trim().is_empty() {
            return Err(BridgeError::ChannelSetup(
                "channel prefix must not be empty".to_string(),
            ));
        }

        Ok(Self {
            prefix: prefix.to_string(),
            request_queue: format!("{prefix}{REQUEST_QUEUE_SUFFIX}"),
            response_queue: format!("{prefix}{RESPONSE_QUEUE_SUFFIX}"),
        })
    }

    /// The logical channel prefix this pair was derived from.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Name of the request queue.
    #[must_use]
    pub fn request_queue(&self) -> &str {
        &self.request_queue
    }

    /// Name of the response queue.
    #[must_use]
    pub fn response_queue(&self) -> &str {
        &self.response_queue
    }
}

impl fmt::Display for QueuePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.request_queue, self.response_queue)
    }
}
