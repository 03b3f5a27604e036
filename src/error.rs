//! Error types for the render cache
//!
//! Cache operations themselves never fail; these errors only surface at the
//! edges (configuration and the admin HTTP surface).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the render cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Configuration values out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Namespace name not recognized
    #[error("Unknown cache namespace: {0}")]
    InvalidNamespace(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
            CacheError::InvalidNamespace(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the render cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_namespace_is_bad_request() {
        let response = CacheError::InvalidNamespace("pdf".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_invalid_config_is_bad_request() {
        let response = CacheError::InvalidConfig("ttl".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_error_messages() {
        let err = CacheError::InvalidConfig("ttl must be positive".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: ttl must be positive");
    }
}
