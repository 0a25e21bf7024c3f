//! Prometheus metrics endpoint handler.
//!
//! Provides the `/metrics` endpoint for Prometheus scraping.
//!
//! # Security
//!
//! This endpoint is unauthenticated to allow Prometheus to scrape
//! metrics. No PII or secrets are exposed; only operational data with
//! bounded-cardinality labels.

use axum::{extract::State, http::header, response::IntoResponse};

use crate::routes::AppState;

/// Content type of the Prometheus text exposition format.
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Handler for GET /metrics
///
/// Returns the registry snapshot in the Prometheus text format. Reading
/// the snapshot has no side effects on the registry; the route sits
/// outside the instrumented router so scraping does not perturb the
/// metrics it reports.
///
/// # Response
///
/// ```text
/// # TYPE app_requests_total counter
/// app_requests_total{method="GET",endpoint="/",status="200"} 42
/// ```
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
        state.registry.render_snapshot(),
    )
}
