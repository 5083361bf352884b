use super::backend::BackendSlot;
use super::identifier::identify_request;
use super::types::LimitPolicy;
use crate::error::{LimiterError, Result};
use crate::metrics;
use axum::http::Request;
use std::future::Future;
use tracing::{debug, error, warn};

/// Admit/deny gate for one route's policy.
///
/// Holds no counter state of its own; every decision goes to whatever
/// backend the slot holds at call time.
#[derive(Clone)]
pub struct RateLimiterGate {
    policy: LimitPolicy,
    backends: BackendSlot,
}

impl RateLimiterGate {
    pub fn new(policy: LimitPolicy, backends: BackendSlot) -> Self {
        Self { policy, backends }
    }

    pub fn policy(&self) -> &LimitPolicy {
        &self.policy
    }

    /// Count a request from `identity` and decide whether it may proceed.
    ///
    /// Returns `BackendNotConfigured` when the slot is empty,
    /// `BackendUnavailable` when the backend fails, and `QuotaExceeded` when
    /// the client is over its limit.
    pub async fn check(&self, identity: &str) -> Result<()> {
        let key = self.policy.key_for(identity).to_string();

        let Some(backend) = self.backends.current().await else {
            error!("No rate limiter backend configured for namespace {}", self.policy.namespace);
            metrics::record_check(&self.policy.namespace, "error");
            return Err(LimiterError::BackendNotConfigured);
        };

        let admitted = match backend
            .check(&key, self.policy.limit, self.policy.window_secs)
            .await
        {
            Ok(admitted) => admitted,
            Err(e) => {
                error!("Rate limiter backend {} failed for key {}: {}", backend.name(), key, e);
                metrics::record_check(&self.policy.namespace, "error");
                return Err(match e {
                    LimiterError::BackendUnavailable(_) => e,
                    other => LimiterError::BackendUnavailable(other.to_string()),
                });
            }
        };

        if !admitted {
            warn!(
                "Rate limit exceeded for {} ({} per {}s)",
                key, self.policy.limit, self.policy.window_secs
            );
            metrics::record_check(&self.policy.namespace, "denied");
            metrics::record_rate_limit_exceeded(&self.policy.namespace);
            return Err(LimiterError::QuotaExceeded {
                limit: self.policy.limit,
                window_secs: self.policy.window_secs,
                namespace: self.policy.namespace.clone(),
            });
        }

        debug!("Rate limit check passed for {}", key);
        metrics::record_check(&self.policy.namespace, "admitted");
        Ok(())
    }

    /// Identify the client of `request` and check it.
    ///
    /// The identity is taken before the returned future is created, so the
    /// future does not borrow the request.
    pub fn check_request<'a, B>(
        &'a self,
        request: &Request<B>,
    ) -> impl Future<Output = Result<()>> + Send + 'a
    where
        B: 'a,
    {
        let identity = identify_request(request);
        async move { self.check(&identity).await }
    }
}
