//! Background Tasks Module
//!
//! Contains the periodic tasks the cache runs alongside its consumers.
//!
//! # Tasks
//! - Cache sweep: removes expired entries from the shared store
//! - Auto-refresh: re-runs a resource's fetch on a fixed period

mod refresh;
mod sweep;

pub use refresh::spawn_refresh_loop;
pub use sweep::{spawn_sweep_task, MIN_SWEEP_INTERVAL};
