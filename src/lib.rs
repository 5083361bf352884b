pub mod config;
pub mod error;
pub mod metrics;
pub mod rate_limit;
pub mod routes;

use crate::config::AppConfig;
use crate::error::{LimiterError, Result};
use crate::metrics::MetricsService;
use crate::rate_limit::{select_backend, BackendSlot};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

pub use crate::routes::build_app;

/// Initialize the rate limited service
pub async fn init_service(config: AppConfig) -> Result<()> {
    // Validate configuration, including the route namespaces, before any
    // global or network setup
    config.validate()?;
    routes::check_route_policies(&config)?;

    info!("Starting rate limited service");

    let metrics = MetricsService::new()?;

    // Backend is chosen once for the process lifetime
    let backend = select_backend(&config.redis.url, config.redis.connect_timeout()).await;
    let backends = BackendSlot::with_backend(Arc::new(backend));

    let app = build_app(&config, backends, Some(metrics))?;

    // Bind and serve
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(LimiterError::Io)?;

    info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| LimiterError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}

/// Initialize tracing/logging
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ratelimiter=debug,tower_http=debug".into()),
        )
        .with_target(false)
        .compact()
        .init();
}
