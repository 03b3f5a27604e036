//! Render Cache - bounded caching for PDF template rendering
//!
//! Keeps template objects, rendered markup and rendered stylesheets in three
//! independent namespaces with TTL expiration, LRU eviction, hit/miss
//! statistics and memory-pressure relief. An optional admin HTTP surface
//! exposes statistics and maintenance operations.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
mod tasks;

pub use api::AppState;
pub use cache::{CacheEngine, KeyHasher, Namespace, Template, TemplateSource, WarmUpReport};
pub use config::{Config, ServerConfig};
pub use error::{CacheError, Result};
