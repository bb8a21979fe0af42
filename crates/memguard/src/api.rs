//! HTTP API for health checks and Prometheus metrics

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use memguard_lib::GuardMetrics;
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub metrics: Arc<GuardMetrics>,
}

impl AppState {
    pub fn new(metrics: Arc<GuardMetrics>) -> Self {
        Self { metrics }
    }
}

/// Liveness probe; the process either serves cycles or has exited.
async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Prometheus metrics endpoint, encoding the engine's explicit registry.
async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = state.metrics.registry().gather();
    let mut buffer = Vec::new();

    encoder.encode(&metric_families, &mut buffer).unwrap();

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting metrics exporter");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
