//! Cache Entry Module
//!
//! Defines the type-erased entry stored for each cache key.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

/// Type-erased payload shared between the store and every consumer reading it.
pub type ErasedValue = Arc<dyn Any + Send + Sync>;

/// Freshness window used when `timestamp + ttl` is not representable.
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

// == Cache Entry ==
/// Represents a single cache entry with its freshness window.
#[derive(Clone)]
pub struct CacheEntry {
    /// The last successfully fetched value
    pub data: ErasedValue,
    /// Monotonic instant the entry was written
    pub timestamp: Instant,
    /// Instant after which the entry is stale (`timestamp + ttl`)
    pub expires_at: Instant,
    /// Wall-clock time of the write
    pub written_at: DateTime<Utc>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry written now with the given TTL.
    pub fn new(data: ErasedValue, ttl: Duration) -> Self {
        Self::written_at(data, ttl, Instant::now())
    }

    /// Creates an entry as if written at `now`.
    ///
    /// A TTL too large to add to `now` saturates to [`MAX_TTL`].
    pub fn written_at(data: ErasedValue, ttl: Duration, now: Instant) -> Self {
        let expires_at = now
            .checked_add(ttl)
            .or_else(|| now.checked_add(MAX_TTL))
            .unwrap_or(now);
        Self {
            data,
            timestamp: now,
            expires_at,
            written_at: Utc::now(),
        }
    }

    // == Is Stale ==
    /// Checks if the entry is past its freshness window.
    ///
    /// An entry is stale once `now >= expires_at`, so an entry written with a
    /// zero TTL is stale immediately.
    pub fn is_stale(&self) -> bool {
        self.is_stale_at(Instant::now())
    }

    /// Staleness relative to an explicit instant.
    pub fn is_stale_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// Remaining freshness, zero once stale.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    /// Time elapsed since the entry was written.
    pub fn age(&self) -> Duration {
        Instant::now().saturating_duration_since(self.timestamp)
    }

    /// Attempts to view the payload as `T`.
    ///
    /// Returns `None` when the key was populated with a different type.
    pub fn downcast<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.data).downcast::<T>().ok()
    }
}

impl fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("timestamp", &self.timestamp)
            .field("expires_at", &self.expires_at)
            .field("written_at", &self.written_at)
            .finish_non_exhaustive()
    }
}
