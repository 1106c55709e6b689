//! API routes for minislotd
//!
//! POST /deploy - render and submit a katana deployment
//! GET  /health - liveness

use crate::server::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use minislot_common::{DeployResponse, DeploymentRequest, ErrorResponse, HealthResponse};
use std::sync::Arc;
use tracing::{error, info, warn};

type AppStateArc = Arc<AppState>;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: String) -> ApiError {
    (status, Json(ErrorResponse { error: message }))
}

// ============================================================================
// Deploy Routes
// ============================================================================

pub fn deploy_routes() -> Router<AppStateArc> {
    Router::new().route("/deploy", post(create_deployment))
}

async fn create_deployment(
    State(state): State<AppStateArc>,
    payload: Result<Json<DeploymentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DeployResponse>), ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("  Rejected malformed deploy request: {}", rejection.body_text());
        api_error(StatusCode::BAD_REQUEST, rejection.body_text())
    })?;

    info!(
        "  Deploy request: id={} tier={} version={}",
        request.id, request.tier, request.version
    );

    match state.deployer.deploy(&request).await {
        Ok(outcome) => Ok((
            StatusCode::CREATED,
            Json(DeployResponse {
                message: "Deployment created successfully".to_string(),
                namespace: outcome.namespace,
                resources: outcome.resources,
            }),
        )),
        Err(e) if e.is_client_error() => Err(api_error(StatusCode::BAD_REQUEST, e.to_string())),
        Err(e) => {
            error!("  Deployment {} failed at {}: {}", request.id, e.stage(), e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

// ============================================================================
// Health Routes
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/health", get(health_check))
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        alive: true,
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}
