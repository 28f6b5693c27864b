//! API Module
//!
//! Admin HTTP surface over the process-wide cache manager and the portal's
//! built-in form schemas.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /cache/stats` - Store statistics
//! - `GET /cache/entries` - List entries with freshness
//! - `DELETE /cache/entry/:key` - Invalidate a key
//! - `DELETE /cache` - Invalidate by pattern or clear
//! - `POST /cache/sweep` - Sweep expired entries now
//! - `POST /forms/:form/validate` - Validate a form submission

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
