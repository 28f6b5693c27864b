//! Response DTOs for the admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cache::{CacheEntry, CacheStats};

/// Response body for `GET /cache/stats`
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub stale_hits: u64,
    pub misses: u64,
    pub writes: u64,
    pub invalidations: u64,
    pub swept: u64,
    pub total_entries: usize,
    /// Share of reads served from the store, stale or fresh
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            stale_hits: stats.stale_hits,
            misses: stats.misses,
            writes: stats.writes,
            invalidations: stats.invalidations,
            swept: stats.swept,
            total_entries: stats.total_entries,
        }
    }
}

/// One row of `GET /cache/entries`
#[derive(Debug, Clone, Serialize)]
pub struct EntrySummary {
    pub key: String,
    /// Milliseconds since the entry was written
    pub age_ms: u64,
    /// Milliseconds of freshness left, 0 once stale
    pub ttl_remaining_ms: u64,
    pub stale: bool,
    /// Wall-clock write time in ISO 8601 format
    pub written_at: String,
}

impl EntrySummary {
    pub fn new(key: impl Into<String>, entry: &CacheEntry) -> Self {
        Self {
            key: key.into(),
            age_ms: entry.age().as_millis() as u64,
            ttl_remaining_ms: entry.ttl_remaining().as_millis() as u64,
            stale: entry.is_stale(),
            written_at: entry.written_at.to_rfc3339(),
        }
    }
}

/// Response body for `GET /cache/entries`
#[derive(Debug, Clone, Serialize)]
pub struct EntriesResponse {
    pub count: usize,
    pub entries: Vec<EntrySummary>,
}

impl EntriesResponse {
    /// Builds the listing, sorted by key.
    pub fn new(mut entries: Vec<EntrySummary>) -> Self {
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Self {
            count: entries.len(),
            entries,
        }
    }
}

/// Response body for `DELETE /cache/entry/:key`
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub key: String,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' invalidated", key),
            key,
        }
    }
}

/// Response body for `DELETE /cache` and `POST /cache/sweep`
#[derive(Debug, Clone, Serialize)]
pub struct RemovedResponse {
    /// Number of entries removed
    pub removed: usize,
    /// Pattern used, if the removal was pattern-based
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl RemovedResponse {
    pub fn new(removed: usize, pattern: Option<String>) -> Self {
        Self { removed, pattern }
    }
}

/// Response body for `POST /forms/:form/validate`
#[derive(Debug, Clone, Serialize)]
pub struct ValidateFormResponse {
    pub form: String,
    pub valid: bool,
    /// Field path to message; empty when valid
    pub errors: BTreeMap<String, String>,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
