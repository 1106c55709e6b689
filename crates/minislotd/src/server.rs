//! HTTP server for minislotd

use crate::deploy::Deployer;
use crate::routes;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers
pub struct AppState {
    pub deployer: Deployer,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(deployer: Deployer) -> Self {
        Self {
            deployer,
            start_time: Instant::now(),
        }
    }
}

/// Build the router with all routes
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::deploy_routes())
        .merge(routes::health_routes())
        .with_state(Arc::new(state))
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server
pub async fn run(state: AppState, addr: &str) -> Result<()> {
    let app = app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("  Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down gracefully");
    }
}
