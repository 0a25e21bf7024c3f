//! Per-request instrumentation wrapper.
//!
//! For each request passing through the instrumented router this layer,
//! in order: records the start time, opens a request span, logs the
//! correlated trace id, exposes the span context to the handler, runs the
//! handler, closes the span, and records the request into both metric
//! families — for every response, success or failure.
//!
//! Trace-context acquisition is best-effort: an unavailable provider is
//! downgraded to the `none` sentinel and the request proceeds untraced.
//! Handler failures pass through unchanged after the metrics are
//! recorded.

use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use common::trace::{current_trace_id_hex, SpanContext, SpanGuard, TraceError};
use tracing::info;

use crate::observability::metrics::record_http_request;
use crate::routes::AppState;

/// Response header carrying the request's trace id (or the sentinel) for
/// client-side correlation.
pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// Request extension exposing the active span context to handlers, so
/// they can open child spans under the request span.
#[derive(Debug, Clone, Copy)]
pub struct CurrentSpan(pub Option<SpanContext>);

/// Middleware that instruments every request routed through it.
pub async fn instrument_request(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let span = match state.tracer.start_span(&format!("{method} {path}"), None) {
        Ok(span) => Some(span),
        Err(TraceError::ContextUnavailable) => None,
    };
    let trace_id = current_trace_id_hex(span.as_ref());

    request
        .extensions_mut()
        .insert(CurrentSpan(span.as_ref().and_then(SpanGuard::context)));

    info!(trace_id = %trace_id, method = %method, path = %path, "Request received");

    let mut response = next.run(request).await;

    // The span closes before the metrics are recorded; if the request
    // future is dropped mid-flight the guard's release still fires.
    if let Some(span) = span {
        span.end();
    }

    let duration = start.elapsed();
    record_http_request(
        &state.registry,
        &method,
        &path,
        response.status().as_u16(),
        duration,
    );

    if let Ok(value) = HeaderValue::from_str(&trace_id) {
        response.headers_mut().insert(TRACE_ID_HEADER, value);
    }

    response
}
