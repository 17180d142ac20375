//! Response Cache Module
//!
//! Main cache engine mapping request keys to buffered upstream response bodies
//! with a fixed TTL.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::RwLock;

use crate::cache::{CacheEntry, CacheStats};

// == Inner State ==
/// Mutable cache state guarded by the store's lock.
#[derive(Debug, Default)]
struct Inner {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Performance statistics
    stats: CacheStats,
}

// == Response Cache ==
/// TTL-based store for captured upstream response bodies.
///
/// Synchronization lives inside the store; callers share it by cloning and
/// never see the lock. There is no entry cap and no eviction beyond TTL
/// expiry, so high-cardinality traffic grows the map until the TTL catches
/// up — a documented limitation, not an oversight.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    inner: Arc<RwLock<Inner>>,
    /// TTL in seconds applied uniformly to every entry
    ttl: u64,
}

impl ResponseCache {
    // == Constructor ==
    /// Creates a new ResponseCache with the given uniform TTL in seconds.
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            ttl: ttl_seconds,
        }
    }

    // == Get ==
    /// Retrieves the cached body for a key.
    ///
    /// Returns the stored bytes if present and not expired. An expired entry
    /// is removed on the spot and reported as a miss, so stale data is never
    /// returned even before the background sweep runs.
    pub async fn get(&self, key: &str) -> Option<Bytes> {
        let mut inner = self.inner.write().await;

        // Bytes clones are reference-counted, not copies
        let (body, expired) = match inner.entries.get(key) {
            Some(entry) if entry.is_expired() => (None, true),
            Some(entry) => (Some(entry.body.clone()), false),
            None => (None, false),
        };

        if expired {
            inner.entries.remove(key);
            let count = inner.entries.len();
            inner.stats.set_total_entries(count);
        }

        match body {
            Some(body) => {
                inner.stats.record_hit();
                Some(body)
            }
            None => {
                inner.stats.record_miss();
                None
            }
        }
    }

    // == Insert ==
    /// Stores a response body under a key, overwriting any prior entry.
    ///
    /// The expiry is recomputed as now + TTL on every write, so rewriting a
    /// key refreshes its lifetime.
    pub async fn insert(&self, key: String, body: Bytes) {
        let mut inner = self.inner.write().await;
        inner.entries.insert(key, CacheEntry::new(body, self.ttl));
        let count = inner.entries.len();
        inner.stats.set_total_entries(count);
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub async fn cleanup_expired(&self) -> usize {
        let mut inner = self.inner.write().await;

        let expired_keys: Vec<String> = inner
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();

        for key in expired_keys {
            inner.entries.remove(&key);
        }

        let remaining = inner.entries.len();
        inner.stats.set_total_entries(remaining);
        count
    }

    // == Clear ==
    /// Drops every entry. Invoked on shutdown as the store's teardown path.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.entries.clear();
        inner.stats.set_total_entries(0);
    }

    // == Stats ==
    /// Returns a snapshot of the current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let inner = self.inner.read().await;
        let mut stats = inner.stats.clone();
        stats.set_total_entries(inner.entries.len());
        stats
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }
}
