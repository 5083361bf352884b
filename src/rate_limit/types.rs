use crate::error::{LimiterError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Prefix for counter keys written to the shared store
pub const STORE_KEY_PREFIX: &str = "rl";

/// Longest accepted window; its store TTL (`window + 1`) must fit an `i64`
pub const MAX_WINDOW_SECS: u64 = i64::MAX as u64 - 1;

/// Immutable limit policy bound to a route at configuration time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitPolicy {
    /// Maximum number of requests admitted per window
    pub limit: u64,
    /// Window length in seconds
    pub window_secs: u64,
    /// Namespace scoping the counters (usually one per route)
    pub namespace: String,
}

impl LimitPolicy {
    /// Create a validated policy
    pub fn new(limit: u64, window_secs: u64, namespace: impl Into<String>) -> Result<Self> {
        let policy = Self {
            limit,
            window_secs,
            namespace: namespace.into(),
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Check that limit and window are positive, the window is within
    /// `MAX_WINDOW_SECS` and the namespace is set
    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(LimiterError::InvalidPolicy(format!(
                "limit must be > 0 for namespace '{}'",
                self.namespace
            )));
        }
        if self.window_secs == 0 {
            return Err(LimiterError::InvalidPolicy(format!(
                "window must be > 0 for namespace '{}'",
                self.namespace
            )));
        }
        if self.window_secs > MAX_WINDOW_SECS {
            return Err(LimiterError::InvalidPolicy(format!(
                "window must be <= {}s for namespace '{}'",
                MAX_WINDOW_SECS, self.namespace
            )));
        }
        if self.namespace.is_empty() {
            return Err(LimiterError::InvalidPolicy(
                "namespace cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the window as a Duration
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Build the counter key for a client in this policy's namespace
    pub fn key_for(&self, identity: &str) -> RateLimitKey {
        RateLimitKey::new(&self.namespace, identity)
    }
}

/// Counter key `{namespace}:{identity}`, built fresh per request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateLimitKey {
    /// The namespace (route class)
    pub namespace: String,
    /// The client identity
    pub identity: String,
}

impl RateLimitKey {
    /// Create a new rate limit key
    pub fn new(namespace: impl Into<String>, identity: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            identity: identity.into(),
        }
    }

    /// Convert to the shared store key for a given window
    pub fn to_store_key(&self, window_start: u64) -> String {
        store_key(&self.to_string(), window_start)
    }
}

impl fmt::Display for RateLimitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.identity)
    }
}

/// Shared store key `rl:{key}:{window_start}`
pub fn store_key(key: &str, window_start: u64) -> String {
    format!("{}:{}:{}", STORE_KEY_PREFIX, key, window_start)
}

/// Epoch-aligned start of the fixed window containing `now`
pub fn window_start(now: u64, window_secs: u64) -> Result<u64> {
    if window_secs == 0 {
        return Err(LimiterError::InvalidPolicy(
            "window must be > 0".to_string(),
        ));
    }
    Ok(now - (now % window_secs))
}

/// Count of requests seen for one key in one window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowCounter {
    /// Epoch second the window started at
    pub window_start: u64,
    /// Requests counted so far in the window
    pub count: u64,
}

impl WindowCounter {
    /// A counter for a window with no requests yet
    pub fn empty(window_start: u64) -> Self {
        Self {
            window_start,
            count: 0,
        }
    }
}
