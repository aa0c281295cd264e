//! Bounded TTL cache
//!
//! A string-keyed cache bounded by entry count. Entries expire lazily: an
//! expired entry is only removed when its key is next read. When a new key is
//! inserted at capacity, the entry with the oldest insertion time is evicted.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Default maximum number of entries
pub const DEFAULT_MAX_SIZE: usize = 1000;

/// Default time-to-live for an entry
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
    /// Insertion order; breaks ties between equal timestamps
    seq: u64,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.inserted_at) >= ttl
    }
}

struct Inner<V> {
    entries: HashMap<String, CacheEntry<V>>,
    next_seq: u64,
}

/// Thread-safe bounded cache with time-based expiry
pub struct TtlCache<V> {
    inner: Mutex<Inner<V>>,
    max_size: usize,
    ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    /// Create a cache; a `max_size` of zero is treated as one
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                next_seq: 0,
            }),
            max_size: max_size.max(1),
            ttl,
        }
    }

    // The map is never left half-updated, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Inner<V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a live entry, purging it if it has expired
    pub fn get(&self, key: &str) -> Option<V> {
        let mut inner = self.lock();
        let now = Instant::now();

        let expired = inner.entries.get(key)?.is_expired(now, self.ttl);
        if expired {
            inner.entries.remove(key);
            tracing::debug!("Cache entry expired: {}", key);
            return None;
        }

        inner.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Insert or overwrite an entry, evicting the oldest one if full
    pub fn set(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let mut inner = self.lock();

        if !inner.entries.contains_key(&key) && inner.entries.len() >= self.max_size {
            let oldest = inner
                .entries
                .iter()
                .min_by_key(|(_, entry)| (entry.inserted_at, entry.seq))
                .map(|(k, _)| k.clone());

            if let Some(oldest) = oldest {
                inner.entries.remove(&oldest);
                tracing::debug!("Cache full, evicted: {}", oldest);
            }
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
                seq,
            },
        );
    }

    /// Number of stored entries, including expired ones not yet purged
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every entry
    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIZE, DEFAULT_TTL)
    }
}
