//! Cache Sweep Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Weak;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Shortest period the sweep loop will run at.
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(10);

/// Spawns a background task that periodically removes expired entries.
///
/// The task sleeps for `interval` between runs and takes the store's write
/// lock only for the duration of a sweep. It holds a weak reference, so it
/// exits on its own once the owning manager is dropped. Intervals below
/// [`MIN_SWEEP_INTERVAL`] are raised to it.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort it.
///
/// # Example
/// ```ignore
/// let store = Arc::new(RwLock::new(CacheStore::new()));
/// let handle = spawn_sweep_task(Arc::downgrade(&store), Duration::from_secs(60));
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_sweep_task(store: Weak<RwLock<CacheStore>>, interval: Duration) -> JoinHandle<()> {
    let interval = interval.max(MIN_SWEEP_INTERVAL);
    tokio::spawn(async move {
        info!(
            "Starting cache sweep task with interval of {}ms",
            interval.as_millis()
        );

        loop {
            tokio::time::sleep(interval).await;

            let Some(store) = store.upgrade() else {
                debug!("Cache store dropped, stopping sweep task");
                break;
            };

            let removed = {
                let mut guard = store.write().await;
                guard.cleanup_expired()
            };

            if removed > 0 {
                info!("Cache sweep: removed {} expired entries", removed);
            } else {
                debug!("Cache sweep: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn store_with(entries: &[(&str, Duration)]) -> Arc<RwLock<CacheStore>> {
        let mut store = CacheStore::new();
        for (key, ttl) in entries {
            store.insert(*key, Arc::new(()), *ttl);
        }
        Arc::new(RwLock::new(store))
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_removes_expired_entries() {
        let store = store_with(&[("expire_soon", Duration::from_secs(1))]);

        let handle = spawn_sweep_task(Arc::downgrade(&store), Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert!(
            !store.read().await.contains_key("expire_soon"),
            "Expired entry should have been swept"
        );

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_preserves_fresh_entries() {
        let store = store_with(&[("long_lived", Duration::from_secs(3600))]);

        let handle = spawn_sweep_task(Arc::downgrade(&store), Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert!(
            store.read().await.contains_key("long_lived"),
            "Fresh entry should not be removed"
        );

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_stops_when_store_dropped() {
        let store = store_with(&[]);
        let handle = spawn_sweep_task(Arc::downgrade(&store), Duration::from_secs(1));

        drop(store);
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert!(handle.is_finished(), "Task should exit once the store is gone");
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_runs_at_minimum_period() {
        let store = store_with(&[("a", Duration::ZERO), ("b", Duration::ZERO)]);
        let handle = spawn_sweep_task(Arc::downgrade(&store), Duration::ZERO);

        tokio::time::sleep(MIN_SWEEP_INTERVAL / 2).await;
        assert_eq!(store.read().await.len(), 2);

        tokio::time::sleep(MIN_SWEEP_INTERVAL).await;
        assert!(store.read().await.is_empty());

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_can_be_aborted() {
        let store = store_with(&[]);
        let handle = spawn_sweep_task(Arc::downgrade(&store), Duration::from_secs(1));

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
