//! Cache Manager Module
//!
//! Owns the shared [`CacheStore`] and the lifecycle of the periodic sweep.
//! One manager is created at application start and a cloned handle is passed
//! to every consumer that needs cached data.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, CacheStore, Lookup};
use crate::config::Config;
use crate::error::Result;
use crate::tasks::spawn_sweep_task;

/// Default period between two sweeps of expired entries.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

// == Cached ==
/// Typed view of a store read.
#[derive(Debug)]
pub enum Cached<T> {
    /// No entry, or the entry holds a different type
    Missing,
    /// Entry within its TTL
    Fresh { data: Arc<T>, written_at: DateTime<Utc> },
    /// Entry past its TTL
    Stale { data: Arc<T>, written_at: DateTime<Utc> },
}

// == Cache Manager ==
/// Cloneable handle to the shared store and its sweep task.
#[derive(Clone)]
pub struct CacheManager {
    inner: Arc<ManagerInner>,
}

struct ManagerInner {
    store: Arc<RwLock<CacheStore>>,
    sweep_interval: Duration,
    sweep: Mutex<Option<JoinHandle<()>>>,
}

impl CacheManager {
    // == Constructor ==
    /// Creates a manager with an empty store.
    ///
    /// The sweep task is not started until [`ensure_sweep`](Self::ensure_sweep)
    /// is first called.
    pub fn new(sweep_interval: Duration) -> Self {
        Self {
            inner: Arc::new(ManagerInner {
                store: Arc::new(RwLock::new(CacheStore::new())),
                sweep_interval,
                sweep: Mutex::new(None),
            }),
        }
    }

    /// Creates a manager from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.sweep_interval())
    }

    /// Shared store handle.
    pub fn store(&self) -> Arc<RwLock<CacheStore>> {
        Arc::clone(&self.inner.store)
    }

    pub fn sweep_interval(&self) -> Duration {
        self.inner.sweep_interval
    }

    // == Sweep Lifecycle ==
    /// Starts the sweep task unless one is already running.
    ///
    /// Must be called from within a tokio runtime. Returns true if this call
    /// started the task.
    pub fn ensure_sweep(&self) -> bool {
        let mut sweep = self
            .inner
            .sweep
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if sweep.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return false;
        }

        *sweep = Some(spawn_sweep_task(
            Arc::downgrade(&self.inner.store),
            self.inner.sweep_interval,
        ));
        true
    }

    /// Returns true while a sweep task is alive.
    pub fn is_sweeping(&self) -> bool {
        self.inner
            .sweep
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stops the sweep task. Entries are kept.
    pub fn shutdown(&self) {
        self.inner.abort_sweep();
    }

    // == Typed Access ==
    /// Reads `key` and views its payload as `T`.
    ///
    /// A payload of another type is reported as [`Cached::Missing`].
    pub async fn lookup<T: Send + Sync + 'static>(&self, key: &str) -> Cached<T> {
        let lookup = self.inner.store.write().await.lookup(key);

        let Some(entry) = lookup.entry() else {
            return Cached::Missing;
        };

        let Some(data) = entry.downcast::<T>() else {
            warn!(
                key,
                expected = std::any::type_name::<T>(),
                "Cached value has a different type, treating as miss"
            );
            return Cached::Missing;
        };

        let written_at = entry.written_at;
        match lookup {
            Lookup::Fresh(_) => Cached::Fresh { data, written_at },
            _ => Cached::Stale { data, written_at },
        }
    }

    /// Writes a fetched value under `key` with the given TTL.
    ///
    /// Returns the wall-clock write time.
    pub async fn write<T: Send + Sync + 'static>(
        &self,
        key: &str,
        data: Arc<T>,
        ttl: Duration,
    ) -> DateTime<Utc> {
        let entry = self.inner.store.write().await.insert(key, data, ttl);
        debug!(key, ttl_ms = ttl.as_millis() as u64, "Cache entry written");
        entry.written_at
    }

    // == Invalidation ==
    /// Removes a single key.
    pub async fn invalidate(&self, key: &str) -> Result<()> {
        self.inner.store.write().await.remove(key)?;
        debug!(key, "Cache entry invalidated");
        Ok(())
    }

    /// Removes every key containing `pattern`.
    pub async fn invalidate_matching(&self, pattern: &str) -> usize {
        let removed = self.inner.store.write().await.invalidate_matching(pattern);
        info!(pattern, removed, "Invalidated cache entries by pattern");
        removed
    }

    /// Removes every entry.
    pub async fn clear(&self) -> usize {
        let removed = self.inner.store.write().await.clear();
        info!(removed, "Cache cleared");
        removed
    }

    /// Runs one sweep immediately.
    pub async fn sweep_now(&self) -> usize {
        self.inner.store.write().await.cleanup_expired()
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.store.read().await.stats()
    }

    pub async fn len(&self) -> usize {
        self.inner.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.store.read().await.is_empty()
    }
}

impl Default for CacheManager {
    fn default() -> Self {
        Self::new(DEFAULT_SWEEP_INTERVAL)
    }
}

impl ManagerInner {
    fn abort_sweep(&self) {
        let handle = self
            .sweep
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();

        if let Some(handle) = handle {
            handle.abort();
            debug!("Cache sweep task stopped");
        }
    }
}

impl Drop for ManagerInner {
    fn drop(&mut self) {
        self.abort_sweep();
    }
}
