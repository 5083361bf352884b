//! Atomic-increment-with-expiry store used by the shared backend.

use crate::error::Result;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tracing::debug;

/// Minimal capability the shared backend needs from an external store.
///
/// `incr` must be atomic in the store: a missing key is created at 0 and
/// incremented, and concurrent increments are never lost.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Increment `key` by one and return the new value
    async fn incr(&self, key: &str) -> Result<u64>;

    /// Expire `key` after `secs` seconds
    async fn expire(&self, key: &str, secs: u64) -> Result<()>;

    /// Verify the store is reachable
    async fn ping(&self) -> Result<()>;
}

/// Redis-backed counter store
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    /// Connect to Redis at `redis_url`
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;
        Ok(Self { connection })
    }
}

#[async_trait]
impl CounterStore for RedisStore {
    async fn incr(&self, key: &str) -> Result<u64> {
        // ConnectionManager is a cheap handle onto a multiplexed connection.
        let mut conn = self.connection.clone();
        let value: u64 = redis::cmd("INCR").arg(key).query_async(&mut conn).await?;
        Ok(value)
    }

    async fn expire(&self, key: &str, secs: u64) -> Result<()> {
        let mut conn = self.connection.clone();
        let _: i64 = redis::cmd("EXPIRE")
            .arg(key)
            .arg(secs)
            .query_async(&mut conn)
            .await?;
        debug!("Set expiry of {}s on {}", secs, key);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
