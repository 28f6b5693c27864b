//! API Routes
//!
//! Configures the Axum router with all admin endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    delete_entry_handler, entries_handler, health_handler, invalidate_handler, stats_handler,
    sweep_handler, validate_form_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check
/// - `GET /cache/stats` - Store statistics
/// - `GET /cache/entries` - Entries with age and freshness
/// - `DELETE /cache/entry/:key` - Invalidate one key
/// - `DELETE /cache?pattern=p` - Invalidate matching keys, or everything
/// - `POST /cache/sweep` - Remove expired entries now
/// - `POST /forms/:form/validate` - Validate values against a built-in form
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/cache", delete(invalidate_handler))
        .route("/cache/stats", get(stats_handler))
        .route("/cache/entries", get(entries_handler))
        .route("/cache/entry/:key", delete(delete_entry_handler))
        .route("/cache/sweep", post(sweep_handler))
        .route("/forms/:form/validate", post(validate_form_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
