//! Cache Entry Module
//!
//! Defines individual cache entries with recency and access metadata, plus
//! the best-effort size estimate used by the pressure heuristics.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

// == Approximate Size ==
/// Best-effort estimate of how many bytes a cached value occupies.
pub trait ApproxSize {
    fn approx_size(&self) -> usize;
}

impl ApproxSize for str {
    fn approx_size(&self) -> usize {
        self.len()
    }
}

impl ApproxSize for String {
    fn approx_size(&self) -> usize {
        self.len()
    }
}

impl ApproxSize for serde_json::Value {
    /// Length of the compact JSON serialization.
    ///
    /// Walks the value with an explicit stack, so nesting depth is bounded
    /// only by memory.
    fn approx_size(&self) -> usize {
        use serde_json::Value;

        let mut total = 0;
        let mut pending = vec![self];
        while let Some(value) = pending.pop() {
            total += match value {
                Value::Null | Value::Bool(true) => 4,
                Value::Bool(false) => 5,
                Value::Number(n) => n.to_string().len(),
                Value::String(s) => quoted_len(s),
                Value::Array(items) => {
                    pending.extend(items.iter());
                    2 + items.len().saturating_sub(1)
                }
                Value::Object(fields) => {
                    pending.extend(fields.values());
                    let keys: usize = fields.keys().map(|key| quoted_len(key) + 1).sum();
                    2 + fields.len().saturating_sub(1) + keys
                }
            };
        }
        total
    }
}

impl<T: ApproxSize + ?Sized> ApproxSize for Arc<T> {
    fn approx_size(&self) -> usize {
        (**self).approx_size()
    }
}

/// Length of `s` as a JSON string literal, quotes and escapes included.
fn quoted_len(s: &str) -> usize {
    let body: usize = s
        .chars()
        .map(|c| match c {
            '"' | '\\' | '\n' | '\r' | '\t' | '\u{8}' | '\u{c}' => 2,
            c if (c as u32) < 0x20 => 6,
            c => c.len_utf8(),
        })
        .sum();
    body + 2
}

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Insertion time, never mutated
    pub created_at: Instant,
    /// Last successful read (or insertion)
    pub last_accessed_at: Instant,
    /// Number of successful reads since insertion
    pub access_count: u64,
    /// Size estimate computed at insertion
    pub approx_size_bytes: usize,
}

impl<V: ApproxSize> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry stamped with `now`.
    pub fn new(value: V, now: Instant) -> Self {
        let approx_size_bytes = value.approx_size();
        Self {
            value,
            created_at: now,
            last_accessed_at: now,
            access_count: 0,
            approx_size_bytes,
        }
    }
}

impl<V> CacheEntry<V> {
    // == Is Expired ==
    /// Checks if the entry has outlived `ttl` at `now`.
    ///
    /// Boundary condition: an entry whose age equals the TTL is already expired.
    pub fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        self.age(now) >= ttl
    }

    // == Age ==
    /// Time elapsed since insertion, saturating at zero.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    // == Record Access ==
    /// Marks a successful read.
    pub fn record_access(&mut self, now: Instant) {
        self.last_accessed_at = now;
        self.access_count += 1;
    }
}
