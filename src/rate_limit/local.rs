use super::backend::CounterBackend;
use super::clock::{Clock, SystemClock};
use super::types::{window_start, WindowCounter};
use crate::error::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Local (in-memory) fixed window counter backend.
///
/// Each key maps to the counter of the window it was last seen in. A counter
/// from an earlier window is overwritten on the next request for its key;
/// nothing sweeps stale entries, so memory grows with the number of distinct
/// keys.
pub struct LocalBackend {
    counters: DashMap<String, WindowCounter>,
    clock: Arc<dyn Clock>,
}

impl LocalBackend {
    /// Create a new local backend on the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a new local backend reading time from `clock`
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            counters: DashMap::new(),
            clock,
        }
    }

    /// Increment the counter for `key` and return the post-increment count
    fn increment(&self, key: &str, window_start: u64) -> u64 {
        // The entry guard holds the shard lock for the whole read-modify-write.
        let mut counter = self
            .counters
            .entry(key.to_string())
            .or_insert_with(|| WindowCounter::empty(window_start));

        if counter.window_start != window_start {
            debug!(
                "Window rolled over for key {}: {} -> {}",
                key, counter.window_start, window_start
            );
            *counter = WindowCounter::empty(window_start);
        }

        counter.count += 1;
        counter.count
    }

    /// Number of keys held, including ones whose window has passed
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    /// Counter currently stored for `key`
    pub fn counter(&self, key: &str) -> Option<WindowCounter> {
        self.counters.get(key).map(|c| *c)
    }
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CounterBackend for LocalBackend {
    async fn check(&self, key: &str, limit: u64, window_secs: u64) -> Result<bool> {
        let start = window_start(self.clock.now_secs(), window_secs)?;
        let count = self.increment(key, start);
        let allowed = count <= limit;

        if allowed {
            debug!("Local check passed for key {}: {}/{}", key, count, limit);
        } else {
            debug!("Local limit exceeded for key {}: {}/{}", key, count, limit);
        }

        Ok(allowed)
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
