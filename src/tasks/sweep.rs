//! TTL Sweep Task
//!
//! Background task that periodically removes expired entries from all three
//! namespaces.

use std::sync::Weak;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::cache::Namespaces;

/// Spawns a background task that sweeps expired entries every `interval`.
///
/// The task holds only a weak reference to the stores and stops on its own
/// once the engine is destroyed or dropped. Each sweep takes the namespace
/// locks one at a time.
///
/// # Returns
/// A JoinHandle for the spawned task, aborted by `CacheEngine::destroy`.
pub(crate) fn spawn_sweep_task(namespaces: Weak<Namespaces>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            interval_ms = interval.as_millis() as u64,
            "Starting TTL sweep task"
        );

        loop {
            tokio::time::sleep(interval).await;

            let Some(namespaces) = namespaces.upgrade() else {
                debug!("Cache engine dropped, stopping TTL sweep task");
                break;
            };
            if namespaces.is_destroyed() {
                debug!("Cache engine destroyed, stopping TTL sweep task");
                break;
            }

            let removed = namespaces.sweep_expired(Instant::now());

            if removed > 0 {
                info!("TTL sweep: removed {} expired entries", removed);
            } else {
                debug!("TTL sweep: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;

    use crate::cache::{CacheEngine, Namespace};
    use crate::config::Config;

    fn config() -> Config {
        Config::new(10, Duration::from_secs(1), Duration::from_millis(500)).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_task_removes_expired_entries() {
        let engine = CacheEngine::new(config()).unwrap();
        engine.set_template("expiring", json!({"id": "expiring"}));
        engine.set_html("expiring-html", "<html></html>");

        // Past the TTL plus one sweep interval
        tokio::time::sleep(Duration::from_millis(1600)).await;

        assert_eq!(engine.get_stats().size, 0);
        assert_eq!(engine.get_stats().total_misses, 0, "sweep must not count misses");
        engine.destroy();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_task_preserves_valid_entries() {
        let engine = CacheEngine::new(config()).unwrap();

        tokio::time::sleep(Duration::from_millis(700)).await;
        engine.set_css("long_lived", ".a {}");
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(engine.namespace_stats(Namespace::Stylesheet).total_entries, 1);
        assert_eq!(engine.get_css("long_lived").as_deref(), Some(".a {}"));
        engine.destroy();
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_sweep_after_destroy() {
        let engine = CacheEngine::new(config()).unwrap();
        engine.destroy();

        engine.set_html("after-destroy", "<p></p>");
        tokio::time::sleep(Duration::from_secs(5)).await;

        // Expired, but only a read or a manual sweep removes it now
        assert_eq!(engine.get_stats().size, 1);
        assert_eq!(engine.sweep_expired(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_task_stops_when_engine_dropped() {
        let namespaces = Arc::new(Namespaces::new(&config()));
        let handle = spawn_sweep_task(Arc::downgrade(&namespaces), Duration::from_millis(500));

        drop(namespaces);
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(handle.is_finished(), "Task should stop once the stores are gone");
    }

    #[tokio::test]
    async fn test_sweep_task_can_be_aborted() {
        let namespaces = Arc::new(Namespaces::new(&config()));
        let handle = spawn_sweep_task(Arc::downgrade(&namespaces), Duration::from_secs(1));

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
