use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type for rate limiter operations
pub type Result<T> = std::result::Result<T, LimiterError>;

/// Rate limiter error types
#[derive(Error, Debug)]
pub enum LimiterError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid rate limit policy: {0}")]
    InvalidPolicy(String),

    /// No counter backend is installed when a decision is requested
    #[error("Rate limiter backend not configured")]
    BackendNotConfigured,

    /// The active backend failed while counting
    #[error("Rate limiter backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Rate limit exceeded for namespace '{namespace}': {limit} requests per {window_secs}s")]
    QuotaExceeded {
        limit: u64,
        window_secs: u64,
        namespace: String,
    },

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LimiterError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            LimiterError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            LimiterError::InvalidPolicy(_) => StatusCode::INTERNAL_SERVER_ERROR,
            LimiterError::BackendNotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            LimiterError::BackendUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            LimiterError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            LimiterError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            LimiterError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the error is a service-side fault rather than the client's
    pub fn is_server_fault(&self) -> bool {
        !matches!(self, LimiterError::QuotaExceeded { .. })
    }
}

impl From<redis::RedisError> for LimiterError {
    fn from(err: redis::RedisError) -> Self {
        LimiterError::BackendUnavailable(err.to_string())
    }
}

impl IntoResponse for LimiterError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            LimiterError::QuotaExceeded {
                limit,
                window_secs,
                namespace,
            } => Json(json!({
                "detail": {
                    "error": "rate_limit_exceeded",
                    "limit": limit,
                    "window_seconds": window_secs,
                    "namespace": namespace,
                }
            })),
            _ => Json(json!({
                "error": self.to_string(),
                "status": status.as_u16(),
            })),
        };

        (status, body).into_response()
    }
}
