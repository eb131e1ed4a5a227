//! # Correlation IDs
//!
//! Opaque tokens linking a published request to its eventual reply. Composed
//! from the current timestamp, a random salt, and a process-wide sequence
//! counter, so concurrent calls can never collide.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Correlation id for one outstanding call.
///
/// Opaque on the wire; equality is the only operation the bridge performs on
/// received ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// View as the wire-format string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the wire-format string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CorrelationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CorrelationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Generator of unique correlation ids.
///
/// Ids have the shape `"<unix_millis>_<salt>_<sequence>"`. The sequence is an
/// atomic counter, so generation is safe from any task; the timestamp and
/// salt keep ids from different process generations apart.
#[derive(Debug, Default)]
pub struct CorrelationIdGenerator {
    sequence: AtomicU64,
}

impl CorrelationIdGenerator {
    /// Create a generator starting at sequence zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate the next correlation id.
    pub fn next_id(&self) -> CorrelationId {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let salt: u32 = rand::random();
        CorrelationId(format!("{millis}_{salt}_{sequence}"))
    }

    /// Number of ids generated so far.
    #[must_use]
    pub fn generated(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}
