//! Response models for the admin API
//!
//! Statistics and analysis payloads are served straight from the cache
//! types; this module holds the remaining response bodies.

pub mod responses;

// Re-export commonly used types
pub use responses::{ClearResponse, ErrorResponse, HashResponse, HealthResponse, PressureResponse};
