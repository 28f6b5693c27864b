//! Cache Store Module
//!
//! Key space shared by every consumer of a [`CacheManager`](super::CacheManager):
//! a HashMap of type-erased entries with TTL freshness and usage statistics.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::{CacheEntry, CacheStats, ErasedValue};
use crate::error::{CacheError, Result};

// == Lookup ==
/// Outcome of reading a key from the store.
#[derive(Debug, Clone)]
pub enum Lookup {
    /// No entry for the key
    Missing,
    /// Entry within its TTL
    Fresh(CacheEntry),
    /// Entry past its TTL, still usable as a placeholder
    Stale(CacheEntry),
}

impl Lookup {
    /// Returns the entry if one was found, fresh or stale.
    pub fn entry(&self) -> Option<&CacheEntry> {
        match self {
            Lookup::Missing => None,
            Lookup::Fresh(entry) | Lookup::Stale(entry) => Some(entry),
        }
    }
}

// == Cache Store ==
/// Main cache storage with TTL freshness tracking.
#[derive(Debug, Default)]
pub struct CacheStore {
    /// Key to entry storage
    entries: HashMap<String, CacheEntry>,
    /// Usage statistics
    stats: CacheStats,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Insert ==
    /// Stores a value under `key`, overwriting any previous entry.
    ///
    /// The entry's `expires_at` is set to `now + ttl`.
    pub fn insert(&mut self, key: impl Into<String>, data: ErasedValue, ttl: Duration) -> CacheEntry {
        self.insert_at(key, data, ttl, Instant::now())
    }

    /// Stores a value as if written at `now`.
    pub fn insert_at(
        &mut self,
        key: impl Into<String>,
        data: ErasedValue,
        ttl: Duration,
        now: Instant,
    ) -> CacheEntry {
        let entry = CacheEntry::written_at(data, ttl, now);
        self.entries.insert(key.into(), entry.clone());
        self.stats.record_write();
        self.stats.set_total_entries(self.entries.len());
        entry
    }

    // == Lookup ==
    /// Reads an entry and classifies it as fresh or stale.
    ///
    /// Stale entries are left in place; only the sweep or an invalidation
    /// removes them.
    pub fn lookup(&mut self, key: &str) -> Lookup {
        self.lookup_at(key, Instant::now())
    }

    /// Reads an entry relative to an explicit instant.
    pub fn lookup_at(&mut self, key: &str, now: Instant) -> Lookup {
        match self.entries.get(key) {
            Some(entry) if entry.is_stale_at(now) => {
                self.stats.record_stale_hit();
                Lookup::Stale(entry.clone())
            }
            Some(entry) => {
                self.stats.record_hit();
                Lookup::Fresh(entry.clone())
            }
            None => {
                self.stats.record_miss();
                Lookup::Missing
            }
        }
    }

    /// Returns the entry for `key` without touching statistics.
    pub fn peek(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    // == Remove ==
    /// Removes the entry for a single key.
    pub fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.stats.record_invalidations(1);
            self.stats.set_total_entries(self.entries.len());
            Ok(())
        } else {
            Err(CacheError::NotFound(key.to_string()))
        }
    }

    // == Invalidate Matching ==
    /// Removes every entry whose key contains `pattern`.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate_matching(&mut self, pattern: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.contains(pattern));
        let removed = before - self.entries.len();

        self.stats.record_invalidations(removed);
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Clear ==
    /// Removes every entry. Returns the number removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        self.stats.record_invalidations(removed);
        self.stats.set_total_entries(0);
        removed
    }

    // == Cleanup Expired ==
    /// Removes all entries past their `expires_at`.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        self.cleanup_expired_at(Instant::now())
    }

    /// Removes entries stale relative to `now`.
    pub fn cleanup_expired_at(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_stale_at(now));
        let removed = before - self.entries.len();

        self.stats.record_swept(removed);
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Iterates over every key and entry.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &CacheEntry)> {
        self.entries.iter()
    }

    /// Returns true if an entry exists for `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
