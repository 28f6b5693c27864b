//! Auto-Refresh Loop
//!
//! Re-runs a resource's background fetch on a fixed period. The next sleep
//! starts only after the previous fetch finished, so refreshes never overlap.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

/// Spawns a self-rescheduling refresh loop.
///
/// Each cycle sleeps for `interval`, then calls `tick`. `tick` returns the
/// refresh to await, or `None` once its owner is gone, which ends the loop.
pub fn spawn_refresh_loop<F, Fut>(key: String, interval: Duration, mut tick: F) -> JoinHandle<()>
where
    F: FnMut() -> Option<Fut> + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        debug!(key = %key, interval_ms = interval.as_millis() as u64, "Auto-refresh started");

        loop {
            tokio::time::sleep(interval).await;

            let Some(refresh) = tick() else {
                debug!(key = %key, "Resource dropped, stopping auto-refresh");
                break;
            };
            refresh.await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_refresh_loop_ticks_once_per_interval() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);

        let handle = spawn_refresh_loop("k".into(), Duration::from_secs(10), move || {
            let counter = Arc::clone(&counter);
            Some(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
        });

        tokio::time::sleep(Duration::from_secs(35)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_loop_waits_for_slow_refresh() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);

        let handle = spawn_refresh_loop("k".into(), Duration::from_secs(10), move || {
            let counter = Arc::clone(&counter);
            Some(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(10)).await;
            })
        });

        // Ticks at t=10 and t=30; the refresh itself occupies every other window.
        tokio::time::sleep(Duration::from_secs(35)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_loop_ends_when_tick_returns_none() {
        let handle = spawn_refresh_loop("k".into(), Duration::from_secs(1), || {
            None::<std::future::Ready<()>>
        });

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(handle.is_finished());
    }
}
