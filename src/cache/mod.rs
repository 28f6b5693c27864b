//! Cache Module
//!
//! Process-wide TTL store shared by every cached resource, and the manager
//! that owns it together with the periodic sweep.

mod entry;
mod manager;
mod stats;
mod store;


// Re-export public types
pub use entry::{CacheEntry, ErasedValue, MAX_TTL};
pub use manager::{CacheManager, Cached, DEFAULT_SWEEP_INTERVAL};
pub use stats::CacheStats;
pub use store::{CacheStore, Lookup};
