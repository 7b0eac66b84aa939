//! Error types for the cache subsystem
//!
//! Provides unified error handling using thiserror.
//!
//! `CacheError` never reaches application callers: the serializing store and the
//! tiered coordinator log it and degrade to a miss or a no-op. `ApiError` is what
//! the admin HTTP surface reports.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Failures raised inside the cache layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    /// Value could not be encoded to its stored text form
    #[error("Serialization failed for key '{key}': {message}")]
    Serialization { key: String, message: String },

    /// Stored text could not be decoded back into a value
    #[error("Deserialization failed for key '{key}': {message}")]
    Deserialization { key: String, message: String },

    /// A tier raised or rejected an operation
    #[error("[{tier}] backend error: {message}")]
    Backend {
        tier: String,
        message: String,
        transient: bool,
    },

    /// A tier is not reachable at all
    #[error("[{0}] tier unavailable")]
    Unavailable(String),
}

impl CacheError {
    /// Creates a backend error that may succeed if retried.
    pub fn transient(tier: impl Into<String>, message: impl Into<String>) -> Self {
        CacheError::Backend {
            tier: tier.into(),
            message: message.into(),
            transient: true,
        }
    }

    /// Creates a backend error that will not go away on retry.
    pub fn permanent(tier: impl Into<String>, message: impl Into<String>) -> Self {
        CacheError::Backend {
            tier: tier.into(),
            message: message.into(),
            transient: false,
        }
    }

    /// Whether retrying the same operation later could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            CacheError::Backend { transient, .. } => *transient,
            CacheError::Unavailable(_) => true,
            CacheError::Serialization { .. } | CacheError::Deserialization { .. } => false,
        }
    }
}

// == API Error Enum ==
/// Errors reported by the admin HTTP surface.
#[derive(Error, Debug)]
pub enum ApiError {
    /// No store registered under the requested name
    #[error("Cache not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the admin API handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(CacheError::transient("remote", "timeout").is_transient());
        assert!(CacheError::Unavailable("remote".to_string()).is_transient());
        assert!(!CacheError::permanent("remote", "bad auth").is_transient());
        assert!(!CacheError::Serialization {
            key: "k".to_string(),
            message: "boom".to_string(),
        }
        .is_transient());
    }

    #[test]
    fn test_backend_error_display() {
        let err = CacheError::permanent("primary", "connection refused");
        assert_eq!(err.to_string(), "[primary] backend error: connection refused");
    }

    #[test]
    fn test_api_error_status() {
        let response = ApiError::NotFound("documents".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = ApiError::InvalidRequest("bad".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
