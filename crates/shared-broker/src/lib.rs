//! # Shared Broker - Message Broker Boundary for the Queue Bridge
//!
//! The bridge treats the broker as an external collaborator: everything it
//! needs is expressed as three traits and a delivery handle.
//!
//! ```text
//! ┌──────────────┐  connect()   ┌──────────────────┐  open_channel()  ┌───────────────┐
//! │BrokerEndpoint│ ───────────→ │ BrokerConnection │ ───────────────→ │ BrokerChannel │
//! └──────────────┘              └──────────────────┘                  └───────────────┘
//!                                                          declare_queue / publish / consume
//! ```
//!
//! ## Semantics
//!
//! - Queues are **asserted** durable before use, not merely checked.
//! - Publishing carries [`MessageProperties`] (`correlation_id`, `reply_to`).
//! - Consuming uses **manual acknowledgment**: every [`Delivery`] must be
//!   acked or rejected; a delivery dropped without a disposition is requeued.
//!
//! [`InMemoryBroker`] implements the boundary in-process. It is suitable for
//! single-node operation and tests; a networked deployment would implement
//! the same traits over a real broker connection.
//!
//! [`MessageProperties`]: shared_types::MessageProperties

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod error;
pub mod interface;
pub mod memory;

// Re-export main types
pub use error::BrokerError;
pub use interface::{
    AckDisposition, BrokerChannel, BrokerConnection, BrokerEndpoint, Delivery, DeliveryStream,
    QueueStatus,
};
pub use memory::InMemoryBroker;

/// Deliveries buffered per consumer before backpressure.
pub const DEFAULT_CONSUMER_CAPACITY: usize = 64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        assert_eq!(DEFAULT_CONSUMER_CAPACITY, 64);
    }
}
