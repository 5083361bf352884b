use super::backend::CounterBackend;
use super::clock::{Clock, SystemClock};
use super::store::CounterStore;
use super::types::{store_key, window_start, MAX_WINDOW_SECS};
use crate::error::{LimiterError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error};

/// Distributed fixed window backend.
///
/// Counters live in an external store under `rl:{key}:{window_start}`; the
/// store's atomic increment is what makes concurrent checks safe, across
/// any number of service instances. Store failures are returned to the
/// caller, never turned into an admit or deny.
pub struct SharedBackend {
    store: Arc<dyn CounterStore>,
    clock: Arc<dyn Clock>,
}

impl SharedBackend {
    /// Create a new shared backend on the system clock
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn CounterStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Test store connectivity
    pub async fn ping(&self) -> Result<()> {
        self.store.ping().await
    }
}

#[async_trait]
impl CounterBackend for SharedBackend {
    async fn check(&self, key: &str, limit: u64, window_secs: u64) -> Result<bool> {
        let start = window_start(self.clock.now_secs(), window_secs)?;
        if window_secs > MAX_WINDOW_SECS {
            return Err(LimiterError::InvalidPolicy(format!(
                "window of {}s exceeds the store TTL range",
                window_secs
            )));
        }
        let counter_key = store_key(key, start);

        let count = self.store.incr(&counter_key).await.map_err(|e| {
            error!("Store error during rate limit check for {}: {}", counter_key, e);
            e
        })?;

        if count == 1 {
            // One second past the window end absorbs clock skew between instances.
            // Cannot overflow: the window is at most MAX_WINDOW_SECS.
            self.store.expire(&counter_key, window_secs + 1).await?;
        }

        let allowed = count <= limit;
        if allowed {
            debug!("Shared check passed for key {}: {}/{}", counter_key, count, limit);
        } else {
            debug!("Shared limit exceeded for key {}: {}/{}", counter_key, count, limit);
        }

        Ok(allowed)
    }

    fn name(&self) -> &'static str {
        "shared"
    }
}
