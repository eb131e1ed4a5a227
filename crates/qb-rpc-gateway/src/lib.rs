//! # RPC Gateway - Request/Response Calls over a Message Queue
//!
//! Turns an asynchronous publish/subscribe broker into a synchronous-looking
//! request/response call for in-process callers.
//!
//! ```text
//! caller ──call()──→ ┌─────────────┐   publish(correlation_id, reply_to)
//!                    │ RpcGateway  │ ────────────────→ <prefix>_request_queue
//!                    └─────────────┘
//!                      │        ↑ resolve(correlation_id)
//!             register │        │
//!                      ▼        │
//!               ┌────────────────────┐   consume    ┌────────────────────────┐
//!               │  PendingCallStore  │ ←─────────── │ <prefix>_response_queue│
//!               └────────────────────┘              └────────────────────────┘
//! ```
//!
//! ## Call lifecycle
//!
//! 1. Generate a correlation id and register a pending entry.
//! 2. Open a channel for the prefix, asserting both queues durable.
//! 3. Subscribe to the response queue **before** publishing, so a fast reply
//!    cannot be lost.
//! 4. Publish the request with `correlation_id` and `reply_to` set.
//! 5. Await resolution, rejection, or timeout, whichever comes first.
//! 6. Close the channel. One channel per call; consumers never outlive the
//!    exchange they were opened for.
//!
//! Late replies find no pending entry and are acked and dropped.

pub mod channel;
pub mod config;
pub mod correlation;
pub mod gateway;
pub mod pending;
pub mod supervisor;

// Re-export main types
pub use channel::{ChannelState, RpcChannel};
pub use config::{BridgeConfig, DEFAULT_BROKER_URL, DEFAULT_CALL_TIMEOUT};
pub use correlation::{CorrelationId, CorrelationIdGenerator};
pub use gateway::RpcGateway;
pub use pending::{PendingCallStore, PendingStats};
pub use supervisor::ConnectionSupervisor;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeout() {
        assert_eq!(DEFAULT_CALL_TIMEOUT.as_secs(), 30);
    }
}
