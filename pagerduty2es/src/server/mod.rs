//! HTTP server for the metrics and health endpoints.
//!
//! Liveness only: `/health` answers independently of pipeline state, and
//! `/metrics` renders the exporter's registry. Served only in daemon mode.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use prometheus::{Encoder, TextEncoder};
use tracing::info;

use crate::metrics::ExporterMetrics;
use crate::ExporterError;

/// Create the application router.
pub fn create_app(metrics: Arc<ExporterMetrics>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_check))
        .with_state(metrics)
}

/// Run the server on the specified address.
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), ExporterError> {
    info!(address = %addr, "Serving metrics and health endpoints");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Liveness probe.
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Render the exporter metrics in the Prometheus text format.
async fn metrics_handler(State(metrics): State<Arc<ExporterMetrics>>) -> Response {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metrics.gather(), &mut buffer) {
        return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        buffer,
    )
        .into_response()
}
