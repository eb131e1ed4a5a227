//! # Pending Call Store
//!
//! Tracks in-flight calls and matches replies to callers. Pure bookkeeping:
//! no I/O happens here.

use crate::correlation::CorrelationId;
use bytes::Bytes;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use shared_types::BridgeError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// What a pending call eventually receives: raw reply bytes or a failure.
pub type ReplyResult = Result<Bytes, BridgeError>;

/// One call awaiting its reply.
struct PendingCall {
    sender: oneshot::Sender<ReplyResult>,
    created_at: Instant,
}

/// Counters for the store's lifecycle events.
#[derive(Debug, Default)]
pub struct PendingStats {
    /// Calls registered.
    pub registered: AtomicU64,
    /// Calls resolved with a reply.
    pub resolved: AtomicU64,
    /// Calls rejected with an error.
    pub rejected: AtomicU64,
    /// Calls expired by timeout.
    pub timeouts: AtomicU64,
    /// Calls cancelled before completion.
    pub cancelled: AtomicU64,
    /// Replies that matched no pending call and were dropped.
    pub stale_replies: AtomicU64,
}

/// Registry of in-flight calls, keyed by correlation id.
///
/// Each entry is created when a call starts and destroyed on exactly one of
/// resolve, reject, expire, or cancel. A reply for an id with no entry is
/// presumed cross-talk from an already-settled call and is dropped.
pub struct PendingCallStore {
    pending: DashMap<CorrelationId, PendingCall>,
    stats: Arc<PendingStats>,
}

impl PendingCallStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: DashMap::new(),
            stats: Arc::new(PendingStats::default()),
        }
    }

    /// Register a pending call and get the receiver its reply will arrive on.
    ///
    /// # Errors
    ///
    /// `BridgeError::DuplicateCorrelationId` if the id is already tracked.
    pub fn register(
        &self,
        correlation_id: &CorrelationId,
    ) -> Result<oneshot::Receiver<ReplyResult>, BridgeError> {
        match self.pending.entry(correlation_id.clone()) {
            Entry::Occupied(_) => Err(BridgeError::DuplicateCorrelationId(
                correlation_id.to_string(),
            )),
            Entry::Vacant(vacant) => {
                let (sender, receiver) = oneshot::channel();
                vacant.insert(PendingCall {
                    sender,
                    created_at: Instant::now(),
                });
                self.stats.registered.fetch_add(1, Ordering::Relaxed);
                debug!(correlation_id = %correlation_id, "Registered pending call");
                Ok(receiver)
            }
        }
    }

    /// Complete the matching call with a reply body.
    ///
    /// Returns `false` for an unknown id (stale or duplicate reply), which is
    /// logged and otherwise ignored.
    pub fn resolve(&self, correlation_id: &CorrelationId, body: Bytes) -> bool {
        let Some((_, call)) = self.pending.remove(correlation_id) else {
            self.stats.stale_replies.fetch_add(1, Ordering::Relaxed);
            warn!(
                correlation_id = %correlation_id,
                "Reply for unknown or expired correlation id dropped"
            );
            return false;
        };

        let waited = call.created_at.elapsed();
        if call.sender.send(Ok(body)).is_err() {
            // Caller stopped waiting between removal and send.
            self.stats.cancelled.fetch_add(1, Ordering::Relaxed);
            debug!(correlation_id = %correlation_id, "Pending call receiver dropped");
            return false;
        }

        self.stats.resolved.fetch_add(1, Ordering::Relaxed);
        debug!(
            correlation_id = %correlation_id,
            waited_ms = waited.as_millis() as u64,
            "Resolved pending call"
        );
        true
    }

    /// Complete the matching call with a failure.
    pub fn reject(&self, correlation_id: &CorrelationId, error: BridgeError) -> bool {
        let Some((_, call)) = self.pending.remove(correlation_id) else {
            return false;
        };

        self.stats.rejected.fetch_add(1, Ordering::Relaxed);
        debug!(correlation_id = %correlation_id, error = %error, "Rejected pending call");
        call.sender.send(Err(error)).is_ok()
    }

    /// Remove an entry whose deadline passed. A reply arriving afterwards is
    /// treated as stale.
    pub fn expire(&self, correlation_id: &CorrelationId) -> bool {
        if self.pending.remove(correlation_id).is_some() {
            self.stats.timeouts.fetch_add(1, Ordering::Relaxed);
            debug!(correlation_id = %correlation_id, "Expired pending call");
            true
        } else {
            false
        }
    }

    /// Remove an entry for a call abandoned before completion (publish
    /// failure, caller gone).
    pub fn cancel(&self, correlation_id: &CorrelationId) -> bool {
        if self.pending.remove(correlation_id).is_some() {
            self.stats.cancelled.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    /// Whether the id is currently tracked.
    #[must_use]
    pub fn is_pending(&self, correlation_id: &CorrelationId) -> bool {
        self.pending.contains_key(correlation_id)
    }

    /// Number of calls currently in flight.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Lifecycle counters.
    #[must_use]
    pub fn stats(&self) -> Arc<PendingStats> {
        Arc::clone(&self.stats)
    }
}

impl Default for PendingCallStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_and_resolve() {
        let store = PendingCallStore::new();
        let id = CorrelationId::from("c1");

        let rx = store.register(&id).unwrap();
        assert!(store.is_pending(&id));
        assert_eq!(store.pending_count(), 1);

        assert!(store.resolve(&id, Bytes::from_static(b"reply")));
        let result = rx.await.unwrap().unwrap();
        assert_eq!(result.as_ref(), b"reply");
        assert_eq!(store.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_registration_fails() {
        let store = PendingCallStore::new();
        let id = CorrelationId::from("c1");

        let _rx = store.register(&id).unwrap();
        let result = store.register(&id);
        assert!(matches!(
            result.err(),
            Some(BridgeError::DuplicateCorrelationId(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_unknown_id_is_noop() {
        let store = PendingCallStore::new();
        let id = CorrelationId::from("ghost");

        assert!(!store.resolve(&id, Bytes::new()));
        assert_eq!(store.stats().stale_replies.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_reject_delivers_error() {
        let store = PendingCallStore::new();
        let id = CorrelationId::from("c1");

        let rx = store.register(&id).unwrap();
        assert!(store.reject(&id, BridgeError::EmptyReply));

        let result = rx.await.unwrap();
        assert_eq!(result, Err(BridgeError::EmptyReply));
    }

    #[tokio::test]
    async fn test_expire_then_late_reply_dropped() {
        let store = PendingCallStore::new();
        let id = CorrelationId::from("c1");

        let _rx = store.register(&id).unwrap();
        assert!(store.expire(&id));
        assert!(!store.is_pending(&id));

        // The late reply must have no effect.
        assert!(!store.resolve(&id, Bytes::from_static(b"late")));
        assert_eq!(store.stats().timeouts.load(Ordering::Relaxed), 1);
        assert_eq!(store.stats().stale_replies.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_cancel() {
        let store = PendingCallStore::new();
        let id = CorrelationId::from("c1");

        let _rx = store.register(&id).unwrap();
        assert!(store.cancel(&id));
        assert!(!store.cancel(&id));
        assert_eq!(store.stats().cancelled.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_at_most_one_resolution() {
        let store = PendingCallStore::new();
        let id = CorrelationId::from("c1");

        let rx = store.register(&id).unwrap();
        assert!(store.resolve(&id, Bytes::from_static(b"first")));
        assert!(!store.resolve(&id, Bytes::from_static(b"second")));

        let result = rx.await.unwrap().unwrap();
        assert_eq!(result.as_ref(), b"first");
    }
}
