//! Cached Resource Module
//!
//! Stale-while-revalidate access to a single cache key: serve what the store
//! has, refetch in the foreground or background depending on freshness, and
//! publish loading, staleness and error state to observers.

mod controller;
mod options;
mod state;

pub use controller::{CachedResource, FetchFuture};
pub use options::{ResourceOptions, DEFAULT_TTL};
pub use state::{CacheState, FetchMode, FetchOutcome};
