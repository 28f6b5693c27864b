//! API Handlers
//!
//! HTTP request handlers for each admin endpoint.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::cache::CacheManager;
use crate::error::{CacheError, Result};
use crate::models::{
    DeleteResponse, EntriesResponse, EntrySummary, HealthResponse, InvalidateQuery,
    RemovedResponse, StatsResponse, ValidateFormRequest, ValidateFormResponse,
};
use crate::validation::{builtin_form, Schema};

/// Application state shared across all handlers.
///
/// Holds a handle to the same cache manager the rest of the process reads
/// through, so invalidations here are seen by every resource.
#[derive(Clone)]
pub struct AppState {
    pub cache: CacheManager,
}

impl AppState {
    pub fn new(cache: CacheManager) -> Self {
        Self { cache }
    }
}

/// Handler for GET /cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.cache.stats().await.into())
}

/// Handler for GET /cache/entries
///
/// Lists every entry with its age and remaining freshness. Reading the
/// listing does not count as a hit or miss.
pub async fn entries_handler(State(state): State<AppState>) -> Json<EntriesResponse> {
    let store = state.cache.store();
    let store = store.read().await;

    let entries = store
        .iter()
        .map(|(key, entry)| EntrySummary::new(key.as_str(), entry))
        .collect();

    Json(EntriesResponse::new(entries))
}

/// Handler for DELETE /cache/entry/:key
pub async fn delete_entry_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state.cache.invalidate(&key).await?;
    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for DELETE /cache
///
/// With `?pattern=p`, removes keys containing `p`; otherwise clears the store.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Query(query): Query<InvalidateQuery>,
) -> Result<Json<RemovedResponse>> {
    if let Some(error_msg) = query.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let removed = match &query.pattern {
        Some(pattern) => state.cache.invalidate_matching(pattern).await,
        None => state.cache.clear().await,
    };

    Ok(Json(RemovedResponse::new(removed, query.pattern)))
}

/// Handler for POST /cache/sweep
pub async fn sweep_handler(State(state): State<AppState>) -> Json<RemovedResponse> {
    let removed = state.cache.sweep_now().await;
    Json(RemovedResponse::new(removed, None))
}

/// Handler for POST /forms/:form/validate
///
/// Runs a whole-form validation of the submitted values against a built-in
/// schema. Only the first issue per field is reported.
pub async fn validate_form_handler(
    Path(form): Path<String>,
    Json(req): Json<ValidateFormRequest>,
) -> Result<Json<ValidateFormResponse>> {
    let schema = builtin_form(&form).ok_or_else(|| CacheError::UnknownForm(form.clone()))?;

    let mut errors = std::collections::BTreeMap::new();
    if let Err(issues) = schema.validate(&req.values) {
        for issue in issues {
            errors.entry(issue.path).or_insert(issue.message);
        }
    }

    Ok(Json(ValidateFormResponse {
        form,
        valid: errors.is_empty(),
        errors,
    }))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
