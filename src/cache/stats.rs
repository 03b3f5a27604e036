//! Cache Statistics Module
//!
//! Per-namespace counters, engine-wide cumulative hit/miss tracking, and the
//! payloads returned by `get_stats` and `analyze`.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Hit Rate ==
/// Hit rate as a percentage, `0.0` when nothing was requested.
pub fn hit_rate(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64 * 100.0
    }
}

// == Cache Stats ==
/// Counters for a single namespace. Reset by a namespace clear.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Number of successful retrievals
    pub hits: u64,
    /// Number of failed retrievals (key not found or expired)
    pub misses: u64,
    /// Current number of entries
    pub total_entries: usize,
    /// Summed size estimate of the current entries
    pub approx_bytes: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hit rate in percent.
    pub fn hit_rate(&self) -> f64 {
        hit_rate(self.hits, self.misses)
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }
}

// == Stats Collector ==
/// Engine-wide cumulative hit/miss counters.
///
/// Survives namespace clears; only an engine-level clear resets it.
#[derive(Debug, Default)]
pub struct StatsCollector {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of a lookup.
    pub fn record(&self, hit: bool) {
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// Hit/miss figures shared by `EngineStats` and `CacheAnalysis`.
    pub fn performance(&self) -> PerformanceSummary {
        let total_hits = self.hits();
        let total_misses = self.misses();
        PerformanceSummary {
            total_hits,
            total_misses,
            hit_rate: hit_rate(total_hits, total_misses),
        }
    }
}

// == Engine Stats ==
/// Aggregate statistics across all namespaces.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStats {
    /// Entry count summed over the namespaces
    pub size: usize,
    pub total_hits: u64,
    pub total_misses: u64,
    /// Percentage of lookups that hit
    pub hit_rate: f64,
    /// Summed approximate bytes over the namespaces
    pub total_size: usize,
}

/// Cumulative lookup performance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub total_hits: u64,
    pub total_misses: u64,
    pub hit_rate: f64,
}

// == Analysis ==
/// Read-only view of one entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrySnapshot {
    pub key: String,
    /// Milliseconds since insertion
    pub age: u64,
    pub access_count: u64,
}

/// Entries of one namespace, least recently used first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamespaceAnalysis {
    pub size: usize,
    pub entries: Vec<EntrySnapshot>,
}

impl From<Vec<EntrySnapshot>> for NamespaceAnalysis {
    fn from(entries: Vec<EntrySnapshot>) -> Self {
        Self {
            size: entries.len(),
            entries,
        }
    }
}

/// Full engine introspection returned by `CacheEngine::analyze`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheAnalysis {
    pub template_cache: NamespaceAnalysis,
    pub html_cache: NamespaceAnalysis,
    pub css_cache: NamespaceAnalysis,
    pub performance: PerformanceSummary,
}
