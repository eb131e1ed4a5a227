//! # Queue-Bridge Test Suite
//!
//! Unified test crate for cross-crate scenarios:
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── call_flow.rs      # End-to-end exchanges, failure modes, teardown
//!     └── correlation.rs    # Id uniqueness under concurrency
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p qb-tests
//!
//! # By category
//! cargo test -p qb-tests integration::
//! ```

#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;
