use super::gate::RateLimiterGate;
use axum::{
    extract::{Request, State},
    middleware::{from_fn_with_state, Next},
    response::{IntoResponse, Response},
    routing::MethodRouter,
};
use std::sync::Arc;

/// Axum middleware function running the gate ahead of the handler.
///
/// A quota denial becomes a 429 response and any backend problem a 500;
/// the handler only runs when the request is admitted.
pub async fn rate_limit_middleware(
    State(gate): State<Arc<RateLimiterGate>>,
    request: Request,
    next: Next,
) -> Response {
    match gate.check_request(&request).await {
        Ok(()) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}

/// Put `route` behind `gate`
pub fn limited<S>(route: MethodRouter<S>, gate: RateLimiterGate) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route.route_layer(from_fn_with_state(Arc::new(gate), rate_limit_middleware))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::backend::BackendSlot;
    use crate::rate_limit::clock::ManualClock;
    use crate::rate_limit::local::LocalBackend;
    use crate::rate_limit::types::LimitPolicy;
    use axum::{body::Body, extract::ConnectInfo, http::StatusCode, routing::get, Router};
    use std::net::SocketAddr;
    use tower::ServiceExt;

    fn app(slot: BackendSlot) -> Router {
        let gate = RateLimiterGate::new(LimitPolicy::new(2, 60, "test").unwrap(), slot);
        Router::new().route("/", limited(get(|| async { "ok" }), gate))
    }

    async fn status(app: &Router, id: &str) -> StatusCode {
        app.clone()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/")
                    .header("X-RateLimit-Id", id)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_middleware_admits_then_rejects() {
        let backend = LocalBackend::with_clock(Arc::new(ManualClock::new(1_000)));
        let app = app(BackendSlot::with_backend(Arc::new(backend)));

        assert_eq!(status(&app, "a").await, StatusCode::OK);
        assert_eq!(status(&app, "a").await, StatusCode::OK);
        assert_eq!(status(&app, "a").await, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(status(&app, "b").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_middleware_identifies_by_peer_address() {
        let backend = Arc::new(LocalBackend::with_clock(Arc::new(ManualClock::new(1_000))));
        let app = app(BackendSlot::with_backend(backend.clone()));

        let mut request = axum::http::Request::builder()
            .uri("/")
            .body(Body::empty())
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo("10.1.2.3:5000".parse::<SocketAddr>().unwrap()));

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(backend.counter("test:10.1.2.3").unwrap().count, 1);
    }

    #[tokio::test]
    async fn test_middleware_without_backend() {
        let app = app(BackendSlot::new());
        assert_eq!(status(&app, "a").await, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
