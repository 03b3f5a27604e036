//! Response DTOs for the admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::Namespace;

/// Response body for `DELETE /cache` and `DELETE /cache/:namespace`
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Success message
    pub message: String,
    /// Cleared namespace, absent when every namespace was cleared
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<Namespace>,
}

impl ClearResponse {
    /// Response for clearing a single namespace
    pub fn namespace(namespace: Namespace) -> Self {
        Self {
            message: format!("Namespace '{}' cleared", namespace),
            namespace: Some(namespace),
        }
    }

    /// Response for clearing the whole cache
    pub fn all() -> Self {
        Self {
            message: "All namespaces cleared".to_string(),
            namespace: None,
        }
    }
}

/// Response body for `POST /pressure`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PressureResponse {
    /// Capacity of each namespace after relief
    pub max_entries_per_namespace: usize,
}

/// Response body for `POST /hash`
#[derive(Debug, Clone, Serialize)]
pub struct HashResponse {
    /// Fingerprint of the posted JSON value
    pub hash: String,
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

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_namespace_serialize() {
        let resp = ClearResponse::namespace(Namespace::Markup);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["namespace"], "markup");
        assert!(json["message"].as_str().unwrap().contains("markup"));
    }

    #[test]
    fn test_clear_all_omits_namespace() {
        let json = serde_json::to_value(ClearResponse::all()).unwrap();
        assert!(json.get("namespace").is_none());
    }

    #[test]
    fn test_pressure_response_camel_case() {
        let resp = PressureResponse {
            max_entries_per_namespace: 10,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["maxEntriesPerNamespace"], 10);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Something went wrong"));
    }
}
