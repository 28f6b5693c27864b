use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

/// What a consumer currently observes for its resource.
pub struct CacheState<T> {
    /// Last good value, from the store or a fetch
    pub data: Option<Arc<T>>,
    /// A foreground fetch is running
    pub is_loading: bool,
    /// `data` came from an entry past its TTL and has not been replaced yet
    pub is_stale: bool,
    /// Any fetch of this consumer is in flight, foreground or background
    pub is_fetching: bool,
    /// Message of the last failed fetch, cleared by the next success
    pub error: Option<String>,
    /// Write time of the value in `data`
    pub last_updated: Option<DateTime<Utc>>,
}

impl<T> CacheState<T> {
    /// True when there is neither data nor a fetch that could produce it.
    pub fn is_empty(&self) -> bool {
        self.data.is_none() && !self.is_fetching
    }
}

impl<T> Default for CacheState<T> {
    fn default() -> Self {
        Self {
            data: None,
            is_loading: false,
            is_stale: false,
            is_fetching: false,
            error: None,
            last_updated: None,
        }
    }
}

// Manual impl: cloning shares the Arc, so `T` need not be Clone.
impl<T> Clone for CacheState<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            is_loading: self.is_loading,
            is_stale: self.is_stale,
            is_fetching: self.is_fetching,
            error: self.error.clone(),
            last_updated: self.last_updated,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for CacheState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheState")
            .field("data", &self.data)
            .field("is_loading", &self.is_loading)
            .field("is_stale", &self.is_stale)
            .field("is_fetching", &self.is_fetching)
            .field("error", &self.error)
            .field("last_updated", &self.last_updated)
            .finish()
    }
}

/// How a fetch presents itself to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Flags `is_loading` for the duration of the fetch
    Foreground,
    /// Runs without touching `is_loading`
    Background,
}

/// Result of asking a resource to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Fetch succeeded and the store was updated
    Updated,
    /// Fetch failed; the last good value was kept
    Failed(String),
    /// Another fetch of the same consumer was already running; nothing started
    InFlight,
}
