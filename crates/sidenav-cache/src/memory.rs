//! In-process cache tier with time-to-live.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Thread-safe in-memory map whose entries expire after a fixed TTL.
///
/// Values are shared through [`Arc`] so readers never clone the payload.
pub struct MemoryCache<V> {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, Arc<V>)>>,
}

impl<V> MemoryCache<V> {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Get a live entry.
    ///
    /// Expired entries stay in the map until replaced or removed, so
    /// [`MemoryCache::get_stale`] can still serve them.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Arc<V>> {
        self.entries
            .lock()
            .unwrap()
            .get(key)
            .filter(|(inserted, _)| inserted.elapsed() <= self.ttl)
            .map(|(_, value)| Arc::clone(value))
    }

    /// Get an entry regardless of age.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn get_stale(&self, key: &str) -> Option<Arc<V>> {
        self.entries
            .lock()
            .unwrap()
            .get(key)
            .map(|(_, value)| Arc::clone(value))
    }

    /// Insert or replace an entry, restarting its TTL.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn insert(&self, key: &str, value: Arc<V>) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_owned(), (Instant::now(), value));
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn remove(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}
