//! HTTP surface: a health check and three rate limited demo endpoints.

use crate::config::AppConfig;
use crate::error::Result;
use crate::metrics::{metrics_handler, MetricsService};
use crate::rate_limit::{limited, BackendSlot, RateLimiterGate};
use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

/// Namespaces the demo routes are gated by
pub const ROUTE_NAMESPACES: [&str; 3] = ["data", "login", "any"];

/// Check that `config` has a valid policy for every gated route
pub fn check_route_policies(config: &AppConfig) -> Result<()> {
    for namespace in ROUTE_NAMESPACES {
        config.policy(namespace)?;
    }
    Ok(())
}

/// Build the application router.
///
/// `/data`, `/login` and `/limited` are gated by the `data`, `login` and
/// `any` namespaces of `config`; every gate reads its backend from
/// `backends` per request.
pub fn build_app(
    config: &AppConfig,
    backends: BackendSlot,
    metrics: Option<MetricsService>,
) -> Result<Router> {
    let gate = |namespace: &str| -> Result<RateLimiterGate> {
        Ok(RateLimiterGate::new(config.policy(namespace)?, backends.clone()))
    };

    let mut app = Router::new()
        .route("/ping", get(ping))
        .route("/data", limited(get(data), gate("data")?))
        .route("/login", limited(post(login), gate("login")?))
        .route("/limited", limited(get(limited_any), gate("any")?));

    if let Some(metrics) = metrics {
        app = app.route("/metrics", get(metrics_handler).with_state(metrics));
    }

    Ok(app.layer(TraceLayer::new_for_http()))
}

async fn ping() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn data() -> Json<Value> {
    Json(json!({
        "message": "Here is your data",
        "items": [1, 2, 3],
    }))
}

async fn login() -> Json<Value> {
    Json(json!({ "status": "logged_in" }))
}

async fn limited_any() -> Json<Value> {
    Json(json!({ "status": "allowed" }))
}
