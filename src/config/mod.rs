use crate::error::{LimiterError, Result};
use crate::rate_limit::types::LimitPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding the shared store URL
pub const REDIS_URL_ENV: &str = "REDIS_URL";

/// Main service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Shared counter store
    #[serde(default)]
    pub redis: RedisConfig,
    /// Limits per namespace
    #[serde(default = "default_limits")]
    pub limits: BTreeMap<String, LimitConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Redis configuration for distributed rate limiting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// How long the startup connectivity check may take before falling back to local
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
}

/// Limit for one namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitConfig {
    /// Maximum number of requests allowed per window
    pub limit: u64,
    /// Time window for the limit (in seconds)
    pub window_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_redis_url() -> String {
    "redis://localhost:6379/0".to_string()
}

fn default_connect_timeout() -> u64 {
    2000
}

fn default_limits() -> BTreeMap<String, LimitConfig> {
    BTreeMap::from([
        ("data".to_string(), LimitConfig { limit: 10, window_secs: 60 }),
        ("login".to_string(), LimitConfig { limit: 5, window_secs: 60 }),
        ("any".to_string(), LimitConfig { limit: 3, window_secs: 10 }),
    ])
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            connect_timeout_ms: default_connect_timeout(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            redis: RedisConfig::default(),
            limits: default_limits(),
        }
    }
}

impl RedisConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LimiterError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| LimiterError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Apply environment overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(REDIS_URL_ENV) {
            if !url.is_empty() {
                self.redis.url = url;
            }
        }
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.redis.url.is_empty() {
            return Err(LimiterError::Config(
                "Redis URL cannot be empty".to_string(),
            ));
        }

        for namespace in self.limits.keys() {
            self.policy(namespace)?;
        }

        Ok(())
    }

    /// Policy for `namespace`
    pub fn policy(&self, namespace: &str) -> Result<LimitPolicy> {
        let limit = self.limits.get(namespace).ok_or_else(|| {
            LimiterError::Config(format!("No limit configured for namespace '{}'", namespace))
        })?;

        LimitPolicy::new(limit.limit, limit.window_secs, namespace)
            .map_err(|e| LimiterError::Config(e.to_string()))
    }
}
