//! # Shared Types - Wire-Level Types for the Queue Bridge
//!
//! Queue naming, message properties, and the caller-visible error taxonomy.
//! Every other crate in the workspace builds on these definitions; nothing in
//! here performs I/O.

pub mod errors;
pub mod message;
pub mod queues;

// Re-export main types
pub use errors::BridgeError;
pub use message::MessageProperties;
pub use queues::{QueuePair, REQUEST_QUEUE_SUFFIX, RESPONSE_QUEUE_SUFFIX};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_suffixes() {
        assert_eq!(REQUEST_QUEUE_SUFFIX, "_request_queue");
        assert_eq!(RESPONSE_QUEUE_SUFFIX, "_response_queue");
    }
}
