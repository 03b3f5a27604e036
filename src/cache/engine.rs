//! Cache Engine Module
//!
//! Public facade over the three namespace stores: typed accessors, statistics,
//! analysis, memory-pressure relief, warm-up and lifecycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::cache::{
    keys, CacheAnalysis, CacheStats, CanonicalForm, EngineStats, KeyHasher, Namespace,
    NamespaceAnalysis, NamespaceStore, StatsCollector, TemplateSource, WarmUpReport,
    MIN_ENTRIES_PER_NAMESPACE, PRESSURE_DIVISOR,
};
use crate::config::Config;
use crate::error::Result;
use crate::tasks::spawn_sweep_task;

/// Template objects are opaque structured values.
pub type Template = serde_json::Value;

/// Locks a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// == Namespaces ==
/// The three stores, each behind its own lock. Shared with the sweep task.
#[derive(Debug)]
pub(crate) struct Namespaces {
    templates: Mutex<NamespaceStore<Arc<Template>>>,
    markup: Mutex<NamespaceStore<Arc<str>>>,
    stylesheets: Mutex<NamespaceStore<Arc<str>>>,
    destroyed: AtomicBool,
}

impl Namespaces {
    pub(crate) fn new(config: &Config) -> Self {
        let max = config.max_entries_per_namespace;
        let ttl = config.ttl;
        Self {
            templates: Mutex::new(NamespaceStore::new(Namespace::Template, max, ttl)),
            markup: Mutex::new(NamespaceStore::new(Namespace::Markup, max, ttl)),
            stylesheets: Mutex::new(NamespaceStore::new(Namespace::Stylesheet, max, ttl)),
            destroyed: AtomicBool::new(false),
        }
    }

    pub(crate) fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    /// Purges expired entries, one namespace lock at a time.
    pub(crate) fn sweep_expired(&self, now: Instant) -> usize {
        let templates = lock(&self.templates).sweep_expired(now);
        let markup = lock(&self.markup).sweep_expired(now);
        let stylesheets = lock(&self.stylesheets).sweep_expired(now);
        if templates + markup + stylesheets > 0 {
            debug!(templates, markup, stylesheets, "Swept expired entries");
        }
        templates + markup + stylesheets
    }

    fn clear(&self, namespace: Namespace) {
        match namespace {
            Namespace::Template => lock(&self.templates).clear(),
            Namespace::Markup => lock(&self.markup).clear(),
            Namespace::Stylesheet => lock(&self.stylesheets).clear(),
        }
    }

    fn stats(&self, namespace: Namespace) -> CacheStats {
        match namespace {
            Namespace::Template => lock(&self.templates).stats(),
            Namespace::Markup => lock(&self.markup).stats(),
            Namespace::Stylesheet => lock(&self.stylesheets).stats(),
        }
    }

    fn analysis(&self, namespace: Namespace) -> NamespaceAnalysis {
        let entries = match namespace {
            Namespace::Template => lock(&self.templates).snapshot(),
            Namespace::Markup => lock(&self.markup).snapshot(),
            Namespace::Stylesheet => lock(&self.stylesheets).snapshot(),
        };
        NamespaceAnalysis::from(entries)
    }

    fn set_capacity(&self, max_entries: usize) -> usize {
        lock(&self.templates).set_capacity(max_entries)
            + lock(&self.markup).set_capacity(max_entries)
            + lock(&self.stylesheets).set_capacity(max_entries)
    }
}

// == Cache Engine ==
/// Bounded three-namespace cache for template objects, rendered markup and
/// rendered stylesheets.
///
/// Construct one per owner and call [`CacheEngine::destroy`] on shutdown.
/// When built inside a tokio runtime a background task sweeps expired
/// entries every `sweep_interval`; outside a runtime expired entries are
/// only dropped on read or by [`CacheEngine::sweep_expired`].
///
/// No operation returns an error: a miss (absent or expired) is `None`.
#[derive(Debug)]
pub struct CacheEngine {
    namespaces: Arc<Namespaces>,
    config: Mutex<Config>,
    collector: StatsCollector,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl CacheEngine {
    // == Constructor ==
    /// Validates the configuration, builds the stores and starts the sweep.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let namespaces = Arc::new(Namespaces::new(&config));
        let sweeper = match Handle::try_current() {
            Ok(_) => Some(spawn_sweep_task(
                Arc::downgrade(&namespaces),
                config.sweep_interval,
            )),
            Err(_) => {
                warn!("No tokio runtime available, periodic sweep disabled");
                None
            }
        };

        info!(
            max_entries = config.max_entries_per_namespace,
            ttl_ms = config.ttl.as_millis() as u64,
            sweep_interval_ms = config.sweep_interval.as_millis() as u64,
            "Cache engine started"
        );

        Ok(Self {
            namespaces,
            config: Mutex::new(config),
            collector: StatsCollector::new(),
            sweeper: Mutex::new(sweeper),
        })
    }

    // == Templates ==
    pub fn set_template(&self, key: impl Into<String>, template: impl Into<Arc<Template>>) {
        lock(&self.namespaces.templates).set(key, template.into());
    }

    pub fn get_template(&self, key: &str) -> Option<Arc<Template>> {
        let value = lock(&self.namespaces.templates).get(key);
        self.collector.record(value.is_some());
        value
    }

    /// Expiry-aware presence check; does not count as a hit or miss.
    pub fn has_template(&self, key: &str) -> bool {
        lock(&self.namespaces.templates).has(key)
    }

    // == Markup ==
    pub fn set_html(&self, key: impl Into<String>, markup: impl Into<Arc<str>>) {
        lock(&self.namespaces.markup).set(key, markup.into());
    }

    pub fn get_html(&self, key: &str) -> Option<Arc<str>> {
        let value = lock(&self.namespaces.markup).get(key);
        self.collector.record(value.is_some());
        value
    }

    // == Stylesheets ==
    pub fn set_css(&self, key: impl Into<String>, stylesheet: impl Into<Arc<str>>) {
        lock(&self.namespaces.stylesheets).set(key, stylesheet.into());
    }

    pub fn get_css(&self, key: &str) -> Option<Arc<str>> {
        let value = lock(&self.namespaces.stylesheets).get(key);
        self.collector.record(value.is_some());
        value
    }

    // == Key Builders ==
    /// `markup_<templateId>_<dataHash>_<customizationsHash|none>`
    pub fn generate_html_cache_key(
        &self,
        template_id: &str,
        data_hash: &str,
        customizations_hash: Option<&str>,
    ) -> String {
        keys::markup_key(template_id, data_hash, customizations_hash)
    }

    /// `stylesheet_<templateId>_<templateVersion>`
    pub fn generate_css_cache_key(&self, template_id: &str, template_version: &str) -> String {
        keys::stylesheet_key(template_id, template_version)
    }

    /// Fingerprint of a structured value, for composing keys.
    pub fn generate_hash<T: CanonicalForm + ?Sized>(value: &T) -> String {
        KeyHasher::hash(value)
    }

    // == Statistics ==
    pub fn get_stats(&self) -> EngineStats {
        let (size, total_size) = Namespace::ALL
            .iter()
            .map(|ns| self.namespaces.stats(*ns))
            .fold((0, 0), |(size, bytes), stats| {
                (size + stats.total_entries, bytes + stats.approx_bytes)
            });
        let performance = self.collector.performance();

        EngineStats {
            size,
            total_hits: performance.total_hits,
            total_misses: performance.total_misses,
            hit_rate: performance.hit_rate,
            total_size,
        }
    }

    /// Counters of one namespace since its last clear.
    pub fn namespace_stats(&self, namespace: Namespace) -> CacheStats {
        self.namespaces.stats(namespace)
    }

    /// Per-entry introspection. Leaves recency and counters untouched.
    pub fn analyze(&self) -> CacheAnalysis {
        CacheAnalysis {
            template_cache: self.namespaces.analysis(Namespace::Template),
            html_cache: self.namespaces.analysis(Namespace::Markup),
            css_cache: self.namespaces.analysis(Namespace::Stylesheet),
            performance: self.collector.performance(),
        }
    }

    // == Clearing ==
    /// Empties one namespace; cumulative hit/miss totals are kept.
    pub fn clear_cache(&self, namespace: Namespace) {
        self.namespaces.clear(namespace);
        info!(%namespace, "Cleared cache namespace");
    }

    /// Empties every namespace and resets the cumulative totals.
    pub fn clear(&self) {
        for namespace in Namespace::ALL {
            self.namespaces.clear(namespace);
        }
        self.collector.reset();
    }

    /// Removes expired entries from every namespace now.
    pub fn sweep_expired(&self) -> usize {
        self.namespaces.sweep_expired(Instant::now())
    }

    // == Memory Pressure ==
    /// Halves the per-namespace capacity (never below the floor, never
    /// upwards) and evicts every namespace down to it.
    ///
    /// Returns the new capacity.
    pub fn handle_memory_pressure(&self) -> usize {
        let mut config = lock(&self.config);
        let current = config.max_entries_per_namespace;
        let floor = MIN_ENTRIES_PER_NAMESPACE.min(current).max(1);
        let reduced = (current / PRESSURE_DIVISOR).max(floor);
        config.max_entries_per_namespace = reduced;

        // Config stays locked until every store has adopted the new bound.
        let evicted = self.namespaces.set_capacity(reduced);
        warn!(
            previous = current,
            max_entries = reduced,
            evicted,
            "Memory pressure: shrank cache capacity"
        );
        reduced
    }

    /// Current configuration (capacity reflects pressure relief).
    pub fn config(&self) -> Config {
        lock(&self.config).clone()
    }

    // == Warm Up ==
    /// Pre-populates the template namespace from `source`.
    ///
    /// Ids already cached are skipped. Fetch errors are logged and counted,
    /// never returned.
    pub async fn warm_up<S, I>(&self, source: &S, template_ids: I) -> WarmUpReport
    where
        S: TemplateSource,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut report = WarmUpReport::default();

        for id in template_ids {
            let id = id.as_ref();
            report.requested += 1;

            if self.has_template(id) {
                report.skipped += 1;
                continue;
            }

            match source.fetch(id).await {
                Ok(Some(template)) => {
                    self.set_template(id, template);
                    report.loaded += 1;
                }
                Ok(None) => {
                    debug!(template_id = id, "Warm-up source has no such template");
                    report.missing += 1;
                }
                Err(err) => {
                    warn!(template_id = id, error = %err, "Failed to warm template");
                    report.failed += 1;
                }
            }
        }

        info!(
            requested = report.requested,
            loaded = report.loaded,
            skipped = report.skipped,
            missing = report.missing,
            failed = report.failed,
            "Cache warm-up finished"
        );
        report
    }

    // == Lifecycle ==
    /// Stops the periodic sweep and empties the cache. Safe to call again.
    pub fn destroy(&self) {
        let first = !self.namespaces.destroyed.swap(true, Ordering::SeqCst);
        if let Some(handle) = lock(&self.sweeper).take() {
            handle.abort();
        }
        self.clear();
        if first {
            info!("Cache engine destroyed");
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.namespaces.is_destroyed()
    }
}

impl Drop for CacheEngine {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.sweeper).take() {
            handle.abort();
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn engine(max_entries: usize) -> CacheEngine {
        let config = Config::new(max_entries, Duration::from_secs(1), Duration::from_millis(500))
            .unwrap();
        CacheEngine::new(config).unwrap()
    }

    fn template(id: &str) -> Template {
        json!({"id": id, "name": "Modern", "version": "1.0.0"})
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = Config {
            max_entries_per_namespace: 0,
            ..Config::default()
        };
        assert!(CacheEngine::new(config).is_err());
    }

    #[test]
    fn test_runs_without_runtime() {
        let engine = engine(5);
        engine.set_css("c", "body {}");
        assert_eq!(engine.get_css("c").as_deref(), Some("body {}"));
        engine.destroy();
    }

    #[test]
    fn test_template_round_trip() {
        let engine = engine(5);
        engine.set_template("t1", template("t1"));

        assert_eq!(*engine.get_template("t1").unwrap(), template("t1"));
        assert!(engine.has_template("t1"));
        assert!(!engine.has_template("t2"));
        assert!(engine.get_template("t2").is_none());
    }

    #[test]
    fn test_namespaces_are_independent() {
        let engine = engine(5);
        engine.set_template("same", template("same"));
        engine.set_html("same", "<html></html>");
        engine.set_css("same", ".a {}");

        assert_eq!(engine.get_html("same").as_deref(), Some("<html></html>"));
        assert_eq!(engine.get_css("same").as_deref(), Some(".a {}"));
        assert_eq!(engine.get_stats().size, 3);
    }

    #[test]
    fn test_stats_across_namespaces() {
        let engine = engine(5);
        engine.set_template("template-1", template("template-1"));
        engine.set_html("html-1", "<html></html>");
        engine.set_css("css-1", ".test {}");

        engine.get_template("template-1");
        engine.get_template("template-2");
        engine.get_html("html-1");
        engine.get_css("css-2");
        engine.has_template("template-3");

        let stats = engine.get_stats();
        assert_eq!(stats.size, 3);
        assert_eq!(stats.total_hits, 2);
        assert_eq!(stats.total_misses, 2);
        assert_eq!(stats.hit_rate, 50.0);
        assert!(stats.total_size > 0);
    }

    #[test]
    fn test_clear_cache_keeps_totals() {
        let engine = engine(5);
        engine.set_template("k", template("k"));
        engine.set_html("k", "<html></html>");
        engine.get_template("k");

        engine.clear_cache(Namespace::Template);

        assert!(engine.get_template("k").is_none());
        assert!(engine.get_html("k").is_some());
        let stats = engine.get_stats();
        assert_eq!(stats.total_hits, 2);
        assert_eq!(stats.total_misses, 1);
        assert_eq!(engine.namespace_stats(Namespace::Template).hits, 0);
    }

    #[test]
    fn test_clear_resets_totals() {
        let engine = engine(5);
        engine.set_css("k", ".a {}");
        engine.get_css("k");
        engine.get_css("missing");

        engine.clear();

        assert_eq!(
            engine.get_stats(),
            EngineStats {
                size: 0,
                total_hits: 0,
                total_misses: 0,
                hit_rate: 0.0,
                total_size: 0,
            }
        );
    }

    #[test]
    fn test_analyze_reports_access_counts() {
        let engine = engine(5);
        engine.set_template("access-test", template("a"));
        engine.get_template("access-test");
        engine.get_template("access-test");
        engine.get_template("access-test");

        let analysis = engine.analyze();
        let entry = analysis
            .template_cache
            .entries
            .iter()
            .find(|e| e.key == "access-test")
            .unwrap();
        assert_eq!(entry.access_count, 3);
        assert_eq!(analysis.template_cache.size, 1);
        assert_eq!(analysis.html_cache.size, 0);
        assert_eq!(analysis.performance.total_hits, 3);
    }

    #[test]
    fn test_memory_pressure_halves_to_floor() {
        let engine = engine(40);
        for i in 0..40 {
            engine.set_html(format!("html-{}", i), "x".repeat(100));
        }

        assert_eq!(engine.handle_memory_pressure(), 20);
        assert_eq!(engine.get_stats().size, 20);
        assert_eq!(engine.handle_memory_pressure(), MIN_ENTRIES_PER_NAMESPACE);
        assert_eq!(engine.handle_memory_pressure(), MIN_ENTRIES_PER_NAMESPACE);
        assert_eq!(engine.config().max_entries_per_namespace, MIN_ENTRIES_PER_NAMESPACE);
        assert!(engine.namespace_stats(Namespace::Markup).total_entries <= MIN_ENTRIES_PER_NAMESPACE);

        // Most recent keys survive
        assert!(engine.get_html("html-39").is_some());
        assert!(engine.get_html("html-0").is_none());
    }

    #[test]
    fn test_memory_pressure_never_grows_small_cache() {
        let engine = engine(5);
        assert_eq!(engine.handle_memory_pressure(), 5);
        assert_eq!(engine.config().max_entries_per_namespace, 5);
    }

    #[test]
    fn test_new_inserts_respect_reduced_capacity() {
        let engine = engine(40);
        engine.handle_memory_pressure();
        for i in 0..30 {
            engine.set_template(format!("t{}", i), template("t"));
        }
        assert_eq!(engine.namespace_stats(Namespace::Template).total_entries, 20);
    }

    #[test]
    fn test_key_builders() {
        let engine = engine(5);
        assert_eq!(engine.generate_html_cache_key("t1", "d1", None), "markup_t1_d1_none");
        assert_eq!(engine.generate_html_cache_key("t1", "d1", Some("c1")), "markup_t1_d1_c1");
        assert_eq!(engine.generate_css_cache_key("t1", "2.1.0"), "stylesheet_t1_2.1.0");
    }

    #[test]
    fn test_generate_hash() {
        let a = CacheEngine::generate_hash(&json!({"a": 1, "b": 2}));
        assert_eq!(a, CacheEngine::generate_hash(&json!({"b": 2, "a": 1})));
        assert_ne!(a, CacheEngine::generate_hash(&json!({"a": 1, "b": 3})));
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let engine = engine(5);
        engine.set_template("destroy-test", template("d"));

        engine.destroy();
        engine.destroy();

        assert!(engine.is_destroyed());
        assert!(engine.get_template("destroy-test").is_none());
    }
}
