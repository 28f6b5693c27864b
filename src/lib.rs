//! Portal Cache - dashboard data cache and form validation
//!
//! Stale-while-revalidate caching of dashboard data behind caller-supplied
//! async fetch functions, debounced schema validation for the portal's
//! forms, and a small admin API over the shared store.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod resource;
pub mod tasks;
pub mod validation;

pub use api::AppState;
pub use cache::CacheManager;
pub use config::Config;
pub use resource::{CacheState, CachedResource, FetchOutcome, ResourceOptions};
pub use validation::{FormController, FormSchema, Rule, ValidationOptions};
