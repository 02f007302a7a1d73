//! In-memory response cache for upstream API calls
//!
//! Entries are keyed by request URL, expire a fixed TTL after insertion, and
//! are evicted in least-recently-used order once the cache reaches capacity.

use lru::LruCache;
use parking_lot::Mutex;
use serde_json::Value;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default maximum number of cached responses
pub const DEFAULT_CAPACITY: usize = 1000;

/// Default time-to-live for a cached response
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

/// A cached upstream payload with its insertion time
#[derive(Debug)]
struct CacheEntry {
    value: Value,
    inserted_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.duration_since(self.inserted_at) < ttl
    }
}

/// Capacity- and TTL-bounded cache shared by all in-flight requests
///
/// All bookkeeping happens under one lock, which is never held across an
/// `.await`. Concurrent misses on the same key are not coalesced: each caller
/// fetches upstream on its own and the last `set` wins.
#[derive(Debug)]
pub struct ResponseCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN), DEFAULT_TTL)
    }
}

impl ResponseCache {
    /// Creates a cache holding at most `capacity` entries for `ttl` each
    pub fn new(capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Returns the cached value for `key` if it is still fresh
    ///
    /// A hit marks the entry as most recently used. A stale entry is dropped
    /// and reported as a miss.
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        match entries.get(key) {
            Some(entry) if entry.is_fresh(self.ttl, now) => return Some(entry.value.clone()),
            Some(_) => {}
            None => return None,
        }

        debug!(key, "dropping stale cache entry");
        entries.pop(key);
        None
    }

    /// Inserts or overwrites the value stored for `key`
    ///
    /// Inserting a new key into a full cache first drops expired entries, and
    /// if the cache is still full evicts the least recently used one.
    pub fn set(&self, key: impl Into<String>, value: Value) {
        let key = key.into();
        let now = Instant::now();
        let mut entries = self.entries.lock();

        if !entries.contains(&key) && entries.len() >= entries.cap().get() {
            let stale: Vec<String> = entries
                .iter()
                .filter(|(_, entry)| !entry.is_fresh(self.ttl, now))
                .map(|(k, _)| k.clone())
                .collect();
            for k in &stale {
                entries.pop(k);
            }

            if entries.len() >= entries.cap().get() {
                if let Some((evicted, _)) = entries.pop_lru() {
                    debug!(key = %evicted, "evicted least recently used cache entry");
                }
            }
        }

        entries.put(
            key,
            CacheEntry {
                value,
                inserted_at: now,
            },
        );
    }

    /// Number of entries currently held, including ones not yet found stale
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
