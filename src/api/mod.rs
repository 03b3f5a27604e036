//! API Module
//!
//! HTTP handlers and routing for the cache admin surface.
//!
//! # Endpoints
//! - `GET /stats` - Aggregate cache statistics
//! - `GET /analyze` - Per-entry introspection
//! - `DELETE /cache` - Clear every namespace
//! - `DELETE /cache/:namespace` - Clear one namespace
//! - `POST /pressure` - Apply memory-pressure relief
//! - `POST /hash` - Fingerprint a JSON body
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
