//! Request DTOs for the admin API
//!
//! Defines the structure of incoming query strings and request bodies.

use serde::Deserialize;

use crate::validation::FormValues;

/// Query string for `DELETE /cache`
///
/// # Fields
/// - `pattern`: Invalidate keys containing this substring; clears everything when absent
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvalidateQuery {
    #[serde(default)]
    pub pattern: Option<String>,
}

impl InvalidateQuery {
    /// Validates the query
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        match &self.pattern {
            Some(pattern) if pattern.is_empty() => {
                Some("Pattern cannot be empty; omit it to clear the cache".to_string())
            }
            _ => None,
        }
    }
}

/// Request body for `POST /forms/:form/validate`
#[derive(Debug, Clone, Deserialize)]
pub struct ValidateFormRequest {
    /// Field path to submitted value
    #[serde(default)]
    pub values: FormValues,
}
