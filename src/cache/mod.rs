//! Cache Module
//!
//! Bounded template/markup/stylesheet caching with TTL expiration, LRU
//! eviction, statistics and key fingerprinting.

mod engine;
mod entry;
mod hash;
pub mod keys;
mod lru;
mod namespace;
mod stats;
mod store;
mod warmup;


// Re-export public types
pub use engine::{CacheEngine, Template};
pub(crate) use engine::Namespaces;
pub use entry::{ApproxSize, CacheEntry};
pub use hash::{
    CanonicalForm, CanonicalWriter, GraphValue, KeyHasher, SharedList, SharedMap, MAX_CANONICAL_DEPTH,
};
pub use lru::LruTracker;
pub use namespace::Namespace;
pub use stats::{
    hit_rate, CacheAnalysis, CacheStats, EngineStats, EntrySnapshot, NamespaceAnalysis,
    PerformanceSummary, StatsCollector,
};
pub use store::NamespaceStore;
pub use warmup::{TemplateSource, WarmUpReport};

// == Public Constants ==
/// Entries above this size are stored but logged as oversized.
pub const LARGE_ENTRY_BYTES: usize = 1024 * 1024; // 1 MB

/// Memory pressure divides the per-namespace capacity by this factor.
pub const PRESSURE_DIVISOR: usize = 2;

/// Memory pressure never shrinks a namespace below this many entries.
pub const MIN_ENTRIES_PER_NAMESPACE: usize = 10;
