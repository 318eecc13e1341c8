//! TTL cache for provider responses

use dashmap::DashMap;
use std::time::{Duration, Instant};

struct CacheEntry<T> {
    value: T,
    cached_at: Instant,
}

/// Keyed cache with a fixed TTL; expired entries are evicted on access
pub struct ApiCache<T: Clone> {
    entries: DashMap<String, CacheEntry<T>>,
    ttl: Duration,
}

impl<T: Clone> ApiCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Get a value if present and not expired
    pub fn get(&self, key: &str) -> Option<T> {
        if let Some(entry) = self.entries.get(key) {
            if entry.cached_at.elapsed() <= self.ttl {
                return Some(entry.value.clone());
            }
        }
        // Either missing or expired; eviction of a missing key is a no-op
        self.entries.remove(key);
        None
    }

    pub fn insert(&self, key: impl Into<String>, value: T) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                value,
                cached_at: Instant::now(),
            },
        );
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
