//! HTTP routes for the App Service.
//!
//! Defines the Axum router and application state.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::StatusCode,
    middleware,
    routing::get,
    Router,
};
use common::trace::TraceProvider;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::Config;
use crate::handlers;
use crate::middleware::instrument_request;
use crate::observability::metrics::MetricRegistry;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    /// Metric registry: the single mutation authority for all counters
    /// and histograms.
    pub registry: MetricRegistry,

    /// Trace context provider.
    pub tracer: Arc<TraceProvider>,
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/` - instrumented example endpoint
/// - `/health` - liveness probe (plain "OK") - operational, unversioned
/// - `/metrics` - Prometheus metrics endpoint - operational, unversioned
/// - a metered fallback so unmatched paths show up in the request counter
/// - TraceLayer for request logging
/// - a whole-request timeout
pub fn build_routes(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.config.request_timeout_secs);

    // Application routes, wrapped by the per-request instrumentation
    // layer. The fallback lives inside this router so unmatched paths
    // are metered too (normalized to `/other`).
    let instrumented = Router::new()
        .route("/", get(handlers::home))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            instrument_request,
        ))
        .with_state(state.clone());

    // Operational routes. Reading /metrics must not perturb the registry
    // it reports, so these sit outside the instrumentation layer.
    let operational = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(state);

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer - bound the whole request (innermost)
    // 2. TraceLayer - log request details
    instrumented
        .merge(operational)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        // AppState must implement Clone for Axum's State extractor.
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_config_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<Config>();
    }
}
