//! API Routes
//!
//! Configures the Axum router with the admin endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    analyze_handler, clear_all_handler, clear_namespace_handler, hash_handler, health_handler,
    pressure_handler, stats_handler, AppState,
};

/// Creates the admin router with all endpoints configured.
///
/// # Endpoints
/// - `GET /stats` - Aggregate cache statistics
/// - `GET /analyze` - Per-entry introspection
/// - `DELETE /cache` - Clear every namespace
/// - `DELETE /cache/:namespace` - Clear one namespace
/// - `POST /pressure` - Apply memory-pressure relief
/// - `POST /hash` - Fingerprint a JSON body
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/stats", get(stats_handler))
        .route("/analyze", get(analyze_handler))
        .route("/cache", delete(clear_all_handler))
        .route("/cache/:namespace", delete(clear_namespace_handler))
        .route("/pressure", post(pressure_handler))
        .route("/hash", post(hash_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
