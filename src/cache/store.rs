//! Namespace Store Module
//!
//! A bounded key→entry table combining HashMap storage with LRU tracking and
//! TTL expiration. The engine owns one store per namespace.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::cache::{
    ApproxSize, CacheEntry, CacheStats, EntrySnapshot, LruTracker, Namespace, LARGE_ENTRY_BYTES,
};

// == Namespace Store ==
/// Cache storage for one namespace with LRU eviction and TTL support.
///
/// Methods take `&mut self`; callers sharing a store across threads wrap it
/// in a lock scoped to this namespace.
#[derive(Debug)]
pub struct NamespaceStore<V> {
    /// Which partition this store backs (used in logs)
    namespace: Namespace,
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// LRU access tracker
    lru: LruTracker,
    /// Hit/miss counters and size totals
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// Lifetime of every entry
    ttl: Duration,
}

impl<V: ApproxSize + Clone> NamespaceStore<V> {
    // == Constructor ==
    /// Creates a store holding at most `max_entries` entries (at least one).
    pub fn new(namespace: Namespace, max_entries: usize, ttl: Duration) -> Self {
        Self {
            namespace,
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_entries: max_entries.max(1),
            ttl,
        }
    }

    // == Set ==
    /// Stores a value, replacing any previous entry for the key.
    ///
    /// An overwrite starts a brand-new entry (access count back to zero).
    /// Inserting a new key into a full store evicts the least recently used
    /// entry first. Values are never rejected for their size.
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        self.set_at(key.into(), value, Instant::now());
    }

    fn set_at(&mut self, key: String, value: V, now: Instant) {
        let is_overwrite = self.remove_entry(&key).is_some();

        if !is_overwrite {
            while self.entries.len() >= self.max_entries {
                if self.evict_oldest().is_none() {
                    break;
                }
            }
        }

        let entry = CacheEntry::new(value, now);
        if entry.approx_size_bytes > LARGE_ENTRY_BYTES {
            warn!(
                namespace = %self.namespace,
                key = %key,
                bytes = entry.approx_size_bytes,
                "Storing oversized cache entry"
            );
        }

        self.stats.approx_bytes += entry.approx_size_bytes;
        self.lru.touch(&key);
        self.entries.insert(key, entry);
        self.stats.total_entries = self.entries.len();
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Missing and expired keys count as misses; expired entries are removed.
    /// A hit refreshes recency and bumps the access count.
    pub fn get(&mut self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&mut self, key: &str, now: Instant) -> Option<V> {
        let ttl = self.ttl;
        let expired = match self.entries.get_mut(key) {
            None => {
                self.stats.record_miss();
                return None;
            }
            Some(entry) if entry.is_expired(ttl, now) => true,
            Some(entry) => {
                entry.record_access(now);
                false
            }
        };

        if expired {
            self.remove_entry(key);
            self.stats.record_miss();
            debug!(namespace = %self.namespace, key, "Dropped expired entry on read");
            return None;
        }

        self.lru.touch(key);
        self.stats.record_hit();
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Has ==
    /// Checks for a live entry without touching recency or statistics.
    pub fn has(&self, key: &str) -> bool {
        self.has_at(key, Instant::now())
    }

    fn has_at(&self, key: &str, now: Instant) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired(self.ttl, now))
    }

    // == Sweep Expired ==
    /// Removes every entry whose age reached the TTL at `now`.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_expired(&mut self, now: Instant) -> usize {
        let ttl = self.ttl;
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(ttl, now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.remove_entry(key);
        }

        expired_keys.len()
    }

    // == Evict Down ==
    /// Evicts least recently used entries until at most `to_size` remain.
    ///
    /// Returns the number of entries evicted.
    pub fn evict_down(&mut self, to_size: usize) -> usize {
        let mut evicted = 0;
        while self.entries.len() > to_size {
            if self.evict_oldest().is_none() {
                break;
            }
            evicted += 1;
        }
        evicted
    }

    // == Capacity ==
    /// Changes the capacity (at least one) and evicts down to it.
    pub fn set_capacity(&mut self, max_entries: usize) -> usize {
        self.max_entries = max_entries.max(1);
        self.evict_down(self.max_entries)
    }

    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    // == Clear ==
    /// Drops every entry and zeroes the namespace statistics.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.stats = CacheStats::new();
    }

    // == Size ==
    /// Returns the current number of entries.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Summed size estimate of the current entries.
    pub fn approx_bytes(&self) -> usize {
        self.stats.approx_bytes
    }

    // == Stats ==
    /// Returns current namespace statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.total_entries = self.entries.len();
        stats
    }

    // == Snapshot ==
    /// Lists entries from least to most recently used.
    ///
    /// Does not affect recency or statistics.
    pub fn snapshot(&self) -> Vec<EntrySnapshot> {
        self.snapshot_at(Instant::now())
    }

    fn snapshot_at(&self, now: Instant) -> Vec<EntrySnapshot> {
        self.lru
            .iter()
            .filter_map(|key| {
                self.entries.get(key).map(|entry| EntrySnapshot {
                    key: key.to_string(),
                    age: entry.age(now).as_millis() as u64,
                    access_count: entry.access_count,
                })
            })
            .collect()
    }

    // == Internal Helpers ==
    fn evict_oldest(&mut self) -> Option<String> {
        let key = self.lru.evict_oldest()?;
        if let Some(entry) = self.entries.remove(&key) {
            self.stats.approx_bytes = self.stats.approx_bytes.saturating_sub(entry.approx_size_bytes);
        }
        self.stats.total_entries = self.entries.len();
        debug!(namespace = %self.namespace, key = %key, "Evicted least recently used entry");
        Some(key)
    }

    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        self.lru.remove(key);
        self.stats.approx_bytes = self.stats.approx_bytes.saturating_sub(entry.approx_size_bytes);
        self.stats.total_entries = self.entries.len();
        Some(entry)
    }
}
