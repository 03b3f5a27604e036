//! API Handlers
//!
//! HTTP request handlers for the admin endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::cache::{CacheAnalysis, CacheEngine, EngineStats, Namespace};
use crate::config::Config;
use crate::error::Result;
use crate::models::{ClearResponse, HashResponse, HealthResponse, PressureResponse};

/// Application state shared across all handlers.
///
/// The engine synchronizes internally, so handlers share it through an Arc
/// without an outer lock.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache engine
    pub engine: Arc<CacheEngine>,
}

impl AppState {
    /// Creates a new AppState around an engine.
    pub fn new(engine: CacheEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    /// Builds the engine from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(CacheEngine::new(config.clone())?))
    }
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<EngineStats> {
    Json(state.engine.get_stats())
}

/// Handler for GET /analyze
pub async fn analyze_handler(State(state): State<AppState>) -> Json<CacheAnalysis> {
    Json(state.engine.analyze())
}

/// Handler for DELETE /cache
///
/// Clears every namespace and resets the cumulative counters.
pub async fn clear_all_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.engine.clear();
    Json(ClearResponse::all())
}

/// Handler for DELETE /cache/:namespace
pub async fn clear_namespace_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ClearResponse>> {
    let namespace: Namespace = name.parse()?;
    state.engine.clear_cache(namespace);
    Ok(Json(ClearResponse::namespace(namespace)))
}

/// Handler for POST /pressure
///
/// Entry point for an external memory monitor.
pub async fn pressure_handler(State(state): State<AppState>) -> Json<PressureResponse> {
    let max_entries_per_namespace = state.engine.handle_memory_pressure();
    Json(PressureResponse {
        max_entries_per_namespace,
    })
}

/// Handler for POST /hash
///
/// Fingerprints the posted JSON value the same way callers do before
/// building cache keys.
pub async fn hash_handler(Json(value): Json<Value>) -> Json<HashResponse> {
    Json(HashResponse {
        hash: CacheEngine::generate_hash(&value),
    })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
