//! Request DTOs for the admin API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Request body for prefix invalidation (POST /caches/:name/invalidate)
///
/// # Fields
/// - `prefix`: Every key starting with this prefix is removed
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateRequest {
    pub prefix: String,
}

impl InvalidateRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.prefix.is_empty() {
            return Some("Prefix cannot be empty, use DELETE /caches/:name to clear".to_string());
        }
        None
    }
}

/// Request body for starting the guardian (POST /guardian/start)
///
/// # Fields
/// - `interval_secs`: Optional tick interval (uses the configured interval if not specified)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartGuardianRequest {
    #[serde(default)]
    pub interval_secs: Option<u64>,
}

impl StartGuardianRequest {
    pub fn validate(&self) -> Option<String> {
        if self.interval_secs == Some(0) {
            return Some("interval_secs must be positive".to_string());
        }
        None
    }
}
