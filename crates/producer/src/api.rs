//! HTTP API for health checks, session status and Prometheus metrics

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use logcentral_lib::{
    health::{ComponentStatus, HealthRegistry},
    Connection, ConnectionManager, ConnectionState,
};
use anyhow::Context;
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub health_registry: HealthRegistry,
    pub manager: Arc<ConnectionManager>,
}

impl AppState {
    pub fn new(health_registry: HealthRegistry, manager: Arc<ConnectionManager>) -> Self {
        Self {
            health_registry,
            manager,
        }
    }
}

/// Session snapshot served at `/status`
#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub name: String,
    pub hostname: String,
    pub state: ConnectionState,
    pub pending: usize,
    pub pending_text_bytes: usize,
    pub tag_filter: Vec<String>,
}

/// 200 while the process is useful, 503 otherwise
fn check_code(serving: bool) -> StatusCode {
    if serving {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Liveness: a degraded flush or heartbeat is still retried, so only
/// unhealthy components fail the check
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let report = state.health_registry.health().await;
    let code = check_code(report.status != ComponentStatus::Unhealthy);
    (code, Json(report))
}

/// Readiness: registered with the central service
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let report = state.health_registry.readiness().await;
    (check_code(report.ready), Json(report))
}

async fn status(State(state): State<Arc<AppState>>) -> Json<SessionStatus> {
    let manager = &state.manager;
    let stats = manager.buffer_stats();
    Json(SessionStatus {
        name: manager.name(),
        hostname: manager.hostname().to_string(),
        state: manager.state(),
        pending: stats.entries,
        pending_text_bytes: stats.text_bytes,
        tag_filter: manager.tag_filter_snapshot(),
    })
}

/// Client metrics in the Prometheus text format
async fn metrics() -> impl IntoResponse {
    const TEXT: [(&str, &str); 1] = [("content-type", "text/plain; charset=utf-8")];

    let mut body = Vec::new();
    match TextEncoder::new().encode(&prometheus::gather(), &mut body) {
        Ok(()) => (StatusCode::OK, TEXT, body),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, TEXT, Vec::new())
        }
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/status", get(status))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Serve the API on every interface until the process exits
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind API port {}", port))?;
    info!(port, "API server listening");

    axum::serve(listener, create_router(state)).await?;
    Ok(())
}
