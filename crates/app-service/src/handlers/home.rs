//! Home endpoint: the instrumented example workload.
//!
//! Simulates a unit of downstream work inside a child span of the request
//! span, so one request produces a two-span trace with the request span
//! as the root.

use std::time::Duration;

use axum::{extract::State, Extension};
use tracing::info;

use common::trace::TraceError;

use crate::middleware::CurrentSpan;
use crate::routes::AppState;

/// Handler for GET /
pub async fn home(
    State(state): State<AppState>,
    current: Option<Extension<CurrentSpan>>,
) -> &'static str {
    info!("Home endpoint accessed");

    let parent = current.and_then(|Extension(span)| span.0);
    let work = match state.tracer.start_span("home-endpoint", parent.as_ref()) {
        Ok(span) => Some(span),
        // No active trace context; the simulated work simply runs
        // unspanned.
        Err(TraceError::ContextUnavailable) => None,
    };

    tokio::time::sleep(Duration::from_millis(state.config.home_delay_ms)).await;

    if let Some(span) = work {
        span.end();
    }

    "Hello, Observability!"
}
