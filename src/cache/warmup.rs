//! Warm-up support: the fetch abstraction callers plug in and the report the
//! engine returns.

use std::future::Future;

use async_trait::async_trait;
use serde::Serialize;

use crate::cache::Template;

/// Loads templates by id for `CacheEngine::warm_up`.
///
/// `Ok(None)` means the id is unknown to the source; errors are logged and
/// skipped by the engine.
#[async_trait]
pub trait TemplateSource: Send + Sync {
    async fn fetch(&self, template_id: &str) -> anyhow::Result<Option<Template>>;
}

#[async_trait]
impl<F, Fut> TemplateSource for F
where
    F: Fn(&str) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Option<Template>>> + Send + 'static,
{
    async fn fetch(&self, template_id: &str) -> anyhow::Result<Option<Template>> {
        self(template_id).await
    }
}

/// Outcome of a warm-up run. Every requested id lands in exactly one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WarmUpReport {
    pub requested: usize,
    /// Fetched and stored
    pub loaded: usize,
    /// Already cached, not fetched
    pub skipped: usize,
    /// Unknown to the source
    pub missing: usize,
    /// Source returned an error
    pub failed: usize,
}
