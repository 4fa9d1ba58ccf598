//! In-memory template store.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::resource::{ResourceProvider, Template};

/// A template store backed by concurrent hash maps.
///
/// Templates registered with [`cache`](Self::cache) resolve synchronously.
/// Templates registered with [`remote`](Self::remote) only resolve through
/// `fetch`, which then caches them, as a real loader would.
#[derive(Default)]
pub struct MemoryResources {
    cached: DashMap<String, Arc<dyn Template>>,
    remote: DashMap<String, Arc<dyn Template>>,
    latency: Duration,
    fetches: AtomicUsize,
}

impl MemoryResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate load time for every fetch.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Register a pre-loaded template.
    pub fn cache(&self, id: impl Into<String>, template: Arc<dyn Template>) {
        self.cached.insert(id.into(), template);
    }

    /// Register a template that must be fetched first.
    pub fn remote(&self, id: impl Into<String>, template: Arc<dyn Template>) {
        self.remote.insert(id.into(), template);
    }

    /// Drop a template from the cache.
    pub fn evict(&self, id: &str) {
        self.cached.remove(id);
    }

    pub fn is_cached(&self, id: &str) -> bool {
        self.cached.contains_key(id)
    }

    /// Number of fetches started.
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResourceProvider for MemoryResources {
    fn cached(&self, id: &str) -> Option<Arc<dyn Template>> {
        self.cached.get(id).map(|t| Arc::clone(t.value()))
    }

    async fn fetch(&self, id: &str) -> Option<Arc<dyn Template>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.latency.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.latency).await;
        }

        if let Some(template) = self.cached(id) {
            return Some(template);
        }
        let template = self.remote.get(id).map(|t| Arc::clone(t.value()))?;
        self.cached.insert(id.to_owned(), Arc::clone(&template));
        Some(template)
    }
}
