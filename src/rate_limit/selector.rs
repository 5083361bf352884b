use super::backend::Backend;
use super::local::LocalBackend;
use super::shared::SharedBackend;
use super::store::RedisStore;
use crate::error::{LimiterError, Result};
use crate::metrics;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Choose the process-wide backend once at startup.
///
/// Connects to the shared store and pings it within `timeout`. Any failure
/// (bad URL, refused connection, auth error, timeout) is logged and the
/// local backend is used instead; the service stays up but instances no
/// longer share quotas. The store is not retried later.
pub async fn select_backend(redis_url: &str, timeout: Duration) -> Backend {
    match connect_shared(redis_url, timeout).await {
        Ok(shared) => {
            info!("Rate limiter: shared backend connected: {}", redis_url);
            metrics::record_backend_selected(true);
            Backend::Shared(shared)
        }
        Err(e) => {
            warn!(
                "Rate limiter: shared store unavailable ({}), using local backend",
                e
            );
            metrics::record_backend_selected(false);
            Backend::Local(LocalBackend::new())
        }
    }
}

async fn connect_shared(redis_url: &str, timeout: Duration) -> Result<SharedBackend> {
    let connect = async {
        let store = RedisStore::connect(redis_url).await?;
        let backend = SharedBackend::new(Arc::new(store));
        backend.ping().await?;
        Ok::<_, LimiterError>(backend)
    };

    tokio::time::timeout(timeout, connect).await.map_err(|_| {
        LimiterError::BackendUnavailable(format!(
            "connection timed out after {}ms",
            timeout.as_millis()
        ))
    })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::backend::CounterBackend;

    #[tokio::test]
    async fn test_unreachable_store_falls_back_to_local() {
        let backend = select_backend("redis://127.0.0.1:1/0", Duration::from_millis(500)).await;
        assert!(!backend.is_shared());
        assert_eq!(backend.name(), "local");

        let key = format!("any:{}", rand::random::<u32>());
        assert!(backend.check(&key, 1, 3600).await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_url_falls_back_to_local() {
        let backend = select_backend("definitely not a url", Duration::from_millis(500)).await;
        assert!(!backend.is_shared());
    }

    #[tokio::test]
    #[ignore] // Requires Redis
    async fn test_reachable_store_selects_shared() {
        let backend = select_backend("redis://127.0.0.1:6379/0", Duration::from_secs(2)).await;
        assert!(backend.is_shared());
    }
}
