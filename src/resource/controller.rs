//! Stale-while-revalidate controller for one consumer of a cache key.

use std::any::Any;
use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, warn};

use crate::cache::{CacheManager, Cached};
use crate::resource::{CacheState, FetchMode, FetchOutcome, ResourceOptions};
use crate::tasks::spawn_refresh_loop;

/// Boxed future produced by a resource's fetch function.
pub type FetchFuture<T> = Pin<Box<dyn Future<Output = Result<T, String>> + Send>>;

type Fetcher<T> = Arc<dyn Fn() -> FetchFuture<T> + Send + Sync>;

// == Cached Resource ==
/// One consumer's view of a cached key.
///
/// Reads go through the shared [`CacheManager`]; fetches are serialized per
/// resource so that at most one is in flight at any time. Dropping the
/// resource stops its auto-refresh loop, but a fetch already running is left
/// to complete and still writes its result to the store.
pub struct CachedResource<T> {
    inner: Arc<ResourceInner<T>>,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
}

struct ResourceInner<T> {
    manager: CacheManager,
    options: ResourceOptions,
    fetcher: Fetcher<T>,
    state: watch::Sender<CacheState<T>>,
}

impl<T: Send + Sync + 'static> CachedResource<T> {
    // == Constructor ==
    /// Creates a resource reading `options.cache_key` through `manager`.
    ///
    /// `fetch` is called for every refetch; its error is kept as a display
    /// string on the state.
    pub fn new<F, Fut, E>(manager: CacheManager, options: ResourceOptions, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let fetcher: Fetcher<T> = Arc::new(move || {
            let pending = fetch();
            Box::pin(async move { pending.await.map_err(|e| e.to_string()) })
        });
        let (state, _) = watch::channel(CacheState::default());

        Self {
            inner: Arc::new(ResourceInner {
                manager,
                options,
                fetcher,
                state,
            }),
            refresh_task: Mutex::new(None),
        }
    }

    pub fn options(&self) -> &ResourceOptions {
        &self.inner.options
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> CacheState<T> {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<CacheState<T>> {
        self.inner.state.subscribe()
    }

    // == Initialize ==
    /// Serves the cached value for this key, fetching as freshness requires.
    ///
    /// - no entry: foreground fetch, awaited.
    /// - fresh entry: served, no fetch.
    /// - stale entry with stale-while-revalidate: served with `is_stale` set,
    ///   refetched in the background; returns without waiting for it.
    /// - stale entry without it: served as a placeholder, then a foreground
    ///   fetch is awaited.
    ///
    /// Also starts the manager's sweep and this resource's auto-refresh loop
    /// if they are not running. Must be called within a tokio runtime.
    pub async fn initialize(&self) -> CacheState<T> {
        self.inner.manager.ensure_sweep();
        self.start_auto_refresh();

        let key = self.inner.options.cache_key.as_str();
        match self.inner.manager.lookup::<T>(key).await {
            Cached::Missing => {
                debug!(key, "Cache miss, fetching");
                self.inner.fetch(FetchMode::Foreground).await;
            }
            Cached::Fresh { data, written_at } => {
                debug!(key, "Cache hit");
                self.inner.serve(data, written_at, false);
            }
            Cached::Stale { data, written_at } => {
                self.inner.serve(data, written_at, true);
                if self.inner.options.stale_while_revalidate {
                    debug!(key, "Serving stale entry, revalidating in background");
                    let _ = self.inner.launch(FetchMode::Background);
                } else {
                    debug!(key, "Stale entry, refetching");
                    self.inner.fetch(FetchMode::Foreground).await;
                }
            }
        }

        self.state()
    }

    // == Refresh ==
    /// Foreground refetch.
    ///
    /// Returns [`FetchOutcome::InFlight`] without fetching if one is already
    /// running for this resource.
    pub async fn refresh(&self) -> FetchOutcome {
        self.inner.fetch(FetchMode::Foreground).await
    }

    /// Starts a background refetch without waiting for it.
    ///
    /// Returns false if a fetch was already in flight.
    pub fn revalidate(&self) -> bool {
        self.inner.launch(FetchMode::Background).is_some()
    }

    // == Clear Cache ==
    /// Removes this key from the store and forgets the served value.
    ///
    /// Does not refetch. A fetch already in flight is not affected and will
    /// repopulate the store when it completes.
    pub async fn clear_cache(&self) {
        let key = self.inner.options.cache_key.as_str();
        if self.inner.manager.invalidate(key).await.is_err() {
            debug!(key, "Nothing cached to clear");
        }

        self.inner.state.send_modify(|state| {
            state.data = None;
            state.is_stale = false;
            state.last_updated = None;
            state.error = None;
        });
    }

    fn start_auto_refresh(&self) {
        let options = &self.inner.options;
        if !options.auto_refresh() {
            return;
        }

        let mut task = self
            .refresh_task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let weak = Arc::downgrade(&self.inner);
        *task = Some(spawn_refresh_loop(
            options.cache_key.clone(),
            options.refresh_interval,
            move || {
                weak.upgrade().map(|inner| async move {
                    if let Some(handle) = inner.launch(FetchMode::Background) {
                        let _ = handle.await;
                    }
                })
            },
        ));
    }
}

impl<T> Drop for CachedResource<T> {
    fn drop(&mut self) {
        let task = self
            .refresh_task
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(handle) = task {
            handle.abort();
        }
    }
}

impl<T: Send + Sync + 'static> ResourceInner<T> {
    fn serve(&self, data: Arc<T>, written_at: DateTime<Utc>, is_stale: bool) {
        self.state.send_modify(|state| {
            state.data = Some(data);
            state.is_stale = is_stale;
            state.last_updated = Some(written_at);
        });
    }

    /// Starts a fetch and waits for it.
    async fn fetch(self: &Arc<Self>, mode: FetchMode) -> FetchOutcome {
        match self.launch(mode) {
            Some(handle) => handle
                .await
                .unwrap_or_else(|e| FetchOutcome::Failed(e.to_string())),
            None => FetchOutcome::InFlight,
        }
    }

    /// Claims the in-flight slot and spawns the fetch.
    ///
    /// The fetch runs on its own task so that it completes, and releases the
    /// slot, even if the caller stops waiting. A panic anywhere in the fetch
    /// cycle is reported as a failure and also releases the slot.
    fn launch(self: &Arc<Self>, mode: FetchMode) -> Option<JoinHandle<FetchOutcome>> {
        let claimed = self.state.send_if_modified(|state| {
            if state.is_fetching {
                return false;
            }
            state.is_fetching = true;
            if mode == FetchMode::Foreground {
                state.is_loading = true;
            }
            true
        });

        if !claimed {
            debug!(key = %self.options.cache_key, "Fetch already in flight, skipping");
            return None;
        }

        let inner = Arc::clone(self);
        Some(tokio::spawn(async move {
            let worker = Arc::clone(&inner);
            match tokio::spawn(async move { worker.run().await }).await {
                Ok(outcome) => outcome,
                Err(e) => inner.fail(join_error_message(e)),
            }
        }))
    }

    async fn run(&self) -> FetchOutcome {
        let key = self.options.cache_key.as_str();
        let result = match tokio::spawn((self.fetcher)()).await {
            Ok(result) => result,
            Err(e) => Err(join_error_message(e)),
        };

        match result {
            Ok(data) => {
                let data = Arc::new(data);
                let written_at = self
                    .manager
                    .write(key, Arc::clone(&data), self.options.ttl)
                    .await;

                self.state.send_modify(|state| {
                    state.data = Some(data);
                    state.is_stale = false;
                    state.last_updated = Some(written_at);
                    state.error = None;
                    state.is_loading = false;
                    state.is_fetching = false;
                });
                FetchOutcome::Updated
            }
            Err(message) => self.fail(message),
        }
    }

    /// Records a failed fetch and releases the in-flight slot.
    fn fail(&self, message: String) -> FetchOutcome {
        warn!(
            key = %self.options.cache_key,
            error = %message,
            "Fetch failed, keeping last good value"
        );
        self.state.send_modify(|state| {
            state.error = Some(message.clone());
            state.is_loading = false;
            state.is_fetching = false;
        });
        FetchOutcome::Failed(message)
    }
}

fn join_error_message(error: JoinError) -> String {
    if !error.is_panic() {
        return error.to_string();
    }

    let payload: Box<dyn Any + Send> = error.into_panic();
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("fetch panicked: {}", detail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn counting_resource(
        manager: &CacheManager,
        options: ResourceOptions,
        calls: Arc<AtomicUsize>,
    ) -> CachedResource<usize> {
        CachedResource::new(manager.clone(), options, move || {
            let calls = Arc::clone(&calls);
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok::<_, String>(n)
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_initialize_miss_fetches_once() {
        let manager = CacheManager::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let resource =
            counting_resource(&manager, ResourceOptions::new("k"), Arc::clone(&calls));

        let state = resource.initialize().await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(state.data.as_deref(), Some(&1));
        assert!(!state.is_loading);
        assert!(!state.is_fetching);
        assert!(state.last_updated.is_some());
        assert_eq!(manager.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_while_pending_is_noop() {
        let manager = CacheManager::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let resource =
            counting_resource(&manager, ResourceOptions::new("k"), Arc::clone(&calls));

        let (first, second) = tokio::join!(resource.refresh(), resource.refresh());

        assert_eq!(first, FetchOutcome::Updated);
        assert_eq!(second, FetchOutcome::InFlight);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_shows_loading() {
        let manager = CacheManager::default();
        let resource = counting_resource(
            &manager,
            ResourceOptions::new("k"),
            Arc::new(AtomicUsize::new(0)),
        );
        let mut rx = resource.subscribe();

        let (outcome, saw_loading) = tokio::join!(resource.refresh(), async {
            rx.wait_for(|s| s.is_loading).await.is_ok()
        });

        assert_eq!(outcome, FetchOutcome::Updated);
        assert!(saw_loading);
        assert!(!resource.state().is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_fetch_is_reported() {
        let manager = CacheManager::default();
        let resource: CachedResource<u8> =
            CachedResource::new(manager, ResourceOptions::new("k"), || async {
                if true {
                    panic!("upstream exploded");
                }
                Ok::<u8, String>(0)
            });

        let outcome = resource.refresh().await;

        match outcome {
            FetchOutcome::Failed(message) => assert!(message.contains("upstream exploded")),
            other => panic!("expected failure, got {:?}", other),
        }
        let state = resource.state();
        assert!(state.error.is_some());
        assert!(!state.is_fetching);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_refresh_stops_on_drop() {
        let manager = CacheManager::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let options = ResourceOptions::new("k").refresh_interval(Duration::from_secs(10));
        let resource = counting_resource(&manager, options, Arc::clone(&calls));

        resource.initialize().await;
        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        drop(resource);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
