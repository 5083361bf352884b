//! Counter backend capability and the call-time backend accessor.

use super::local::LocalBackend;
use super::shared::SharedBackend;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Atomic check-and-increment over a key within a fixed window.
///
/// `check` increments the counter for `key` in the current epoch-aligned
/// window and returns `true` iff the post-increment count is `<= limit`.
/// Concurrent calls for the same key must never lose or double-count an
/// increment.
#[async_trait]
pub trait CounterBackend: Send + Sync {
    async fn check(&self, key: &str, limit: u64, window_secs: u64) -> Result<bool>;

    /// Short name used in logs and metrics
    fn name(&self) -> &'static str;
}

/// The two backend variants a process can run with
pub enum Backend {
    /// In-process counters
    Local(LocalBackend),
    /// Counters in a shared external store
    Shared(SharedBackend),
}

impl Backend {
    pub fn is_shared(&self) -> bool {
        matches!(self, Backend::Shared(_))
    }
}

#[async_trait]
impl CounterBackend for Backend {
    async fn check(&self, key: &str, limit: u64, window_secs: u64) -> Result<bool> {
        match self {
            Backend::Local(local) => local.check(key, limit, window_secs).await,
            Backend::Shared(shared) => shared.check(key, limit, window_secs).await,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Backend::Local(local) => local.name(),
            Backend::Shared(shared) => shared.name(),
        }
    }
}

/// Holder for the active backend, read by gates on every request.
///
/// Gates resolve the backend through the slot at call time, so the backend
/// can be installed after the routes are built or swapped later.
#[derive(Clone, Default)]
pub struct BackendSlot {
    inner: Arc<RwLock<Option<Arc<dyn CounterBackend>>>>,
}

impl BackendSlot {
    /// An empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot holding the given backend
    pub fn with_backend(backend: Arc<dyn CounterBackend>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(backend))),
        }
    }

    /// Install or replace the active backend
    pub async fn install(&self, backend: Arc<dyn CounterBackend>) {
        info!("Installing rate limiter backend: {}", backend.name());
        *self.inner.write().await = Some(backend);
    }

    /// Remove the active backend
    pub async fn clear(&self) {
        *self.inner.write().await = None;
    }

    /// The currently active backend, if any
    pub async fn current(&self) -> Option<Arc<dyn CounterBackend>> {
        self.inner.read().await.clone()
    }
}
