//! Cross-crate integration scenarios for the bridge.

pub mod call_flow;
pub mod correlation;
