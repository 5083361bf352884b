use crate::error::{LimiterError, Result};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;
use tracing::{debug, info};

/// Metrics service for collecting and exposing Prometheus metrics
#[derive(Clone)]
pub struct MetricsService {
    handle: Arc<PrometheusHandle>,
}

impl MetricsService {
    /// Create a new metrics service, installing the global recorder
    pub fn new() -> Result<Self> {
        let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
            LimiterError::Internal(format!("Failed to install metrics recorder: {}", e))
        })?;

        Self::register_metrics();

        info!("Metrics service initialized successfully");

        Ok(Self {
            handle: Arc::new(handle),
        })
    }

    fn register_metrics() {
        describe_counter!(
            "ratelimit_checks_total",
            "Rate limit decisions by namespace and outcome (admitted, denied, error)"
        );
        describe_counter!(
            "ratelimit_exceeded_total",
            "Total number of requests rejected due to rate limiting"
        );
        describe_gauge!(
            "ratelimit_backend_shared",
            "Active counter backend (1 = shared store, 0 = local)"
        );

        debug!("All metrics registered with descriptions");
    }

    /// Render metrics in Prometheus format
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Metrics endpoint handler
pub async fn metrics_handler(State(service): State<MetricsService>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        service.render(),
    )
}

/// Record the outcome of a rate limit decision
pub fn record_check(namespace: &str, outcome: &'static str) {
    let labels = [
        ("namespace", namespace.to_string()),
        ("outcome", outcome.to_string()),
    ];
    counter!("ratelimit_checks_total", &labels).increment(1);
}

/// Record rate limit exceeded
pub fn record_rate_limit_exceeded(namespace: &str) {
    let labels = [("namespace", namespace.to_string())];
    counter!("ratelimit_exceeded_total", &labels).increment(1);
}

/// Record which backend was selected at startup
pub fn record_backend_selected(shared: bool) {
    gauge!("ratelimit_backend_shared").set(if shared { 1.0 } else { 0.0 });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_functions_dont_panic() {
        // These functions should not panic even if recorder isn't installed
        record_check("data", "admitted");
        record_check("data", "denied");
        record_rate_limit_exceeded("data");
        record_backend_selected(false);
    }

    #[tokio::test]
    async fn test_metrics_service_creation() {
        // The recorder is global, so a second install in the same process fails.
        match MetricsService::new() {
            Ok(service) => {
                record_check("any", "admitted");
                assert!(service.render().contains("ratelimit_checks_total"));
            }
            Err(e) => {
                assert!(e.to_string().contains("recorder"));
            }
        }
    }
}
