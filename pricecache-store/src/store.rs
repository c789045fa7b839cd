//! In-memory expiring store for prices.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::Serialize;
use tracing::debug;

use pricecache_core::clock::{Clock, SystemClock};

/// Cached price with its absolute expiration instant.
///
/// `expires_at` is fixed when the entry is written; a re-write replaces the
/// whole entry rather than extending it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CacheEntry {
    /// Cached price
    pub value: f64,
    /// Instant at which the entry stops being served
    pub expires_at: Instant,
}

impl CacheEntry {
    /// An entry is stale once `now` reaches `expires_at`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Thread-safe key to price map with read-time expiration.
///
/// Reads share the lock; writes, purges and the delete-on-expired-read path
/// take it exclusively.
pub struct ExpiringStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
    max_age: Duration,
    clock: Arc<dyn Clock>,
}

impl ExpiringStore {
    /// Creates a store on the system clock.
    pub fn new(max_age: Duration) -> Self {
        Self::with_clock(max_age, Arc::new(SystemClock))
    }

    /// Creates a store on a custom clock.
    pub fn with_clock(max_age: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_age,
            clock,
        }
    }

    /// Returns the freshness window applied to every write.
    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Gets a fresh price for `key`.
    ///
    /// Returns None if the key is absent or expired. An expired entry is
    /// deleted as a side effect.
    pub fn read(&self, key: &str) -> Option<f64> {
        let now = self.clock.now();

        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired_at(now) => return Some(entry.value),
                Some(_) => {}
            }
        }

        self.evict_if_expired(key, now);
        None
    }

    /// Inserts or replaces the price for `key`, expiring `max_age` from now.
    pub fn write(&self, key: &str, value: f64) {
        let expires_at = self.clock.now() + self.max_age;
        self.entries
            .write()
            .insert(key.to_string(), CacheEntry { value, expires_at });
    }

    fn evict_if_expired(&self, key: &str, now: Instant) {
        let mut entries = self.entries.write();

        // Another reader may have evicted it, or a writer replaced it, between guards.
        if entries.get(key).is_some_and(|e| e.is_expired_at(now)) {
            entries.remove(key);
            debug!(key, "Evicted expired entry");
        }
    }

    /// Returns a copy of the raw entry for `key`, expired or not.
    pub fn entry(&self, key: &str) -> Option<CacheEntry> {
        self.entries.read().get(key).copied()
    }

    /// Returns true if an entry for `key` is stored, without evicting it.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Removes the entry for `key`. Removing an absent key is a no-op.
    pub fn remove(&self, key: &str) {
        self.entries.write().remove(key);
    }

    /// Clears all entries.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Removes all expired entries and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired_at(now));
        before - entries.len()
    }

    /// Returns the number of stored entries, including expired ones.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns store statistics.
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let entries = self.entries.read();
        let expired = entries.values().filter(|e| e.is_expired_at(now)).count();
        CacheStats {
            total_entries: entries.len(),
            expired_entries: expired,
            valid_entries: entries.len().saturating_sub(expired),
        }
    }
}

impl std::fmt::Debug for ExpiringStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiringStore")
            .field("max_age", &self.max_age)
            .field("len", &self.len())
            .finish()
    }
}

/// Store statistics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Total entries (including expired)
    pub total_entries: usize,
    /// Expired entries not yet reclaimed
    pub expired_entries: usize,
    /// Valid (non-expired) entries
    pub valid_entries: usize,
}
