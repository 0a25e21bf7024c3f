//! Shared helpers for integration tests.

#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use app_service::config::Config;
use app_service::observability::metrics::MetricRegistry;
use app_service::routes::AppState;
use common::testing::CapturingExporter;
use common::trace::TraceProvider;

/// Test configuration with a short home delay and timeout.
pub fn test_config(home_delay_ms: u64) -> Config {
    let vars = HashMap::from([
        ("HOME_DELAY_MS".to_string(), home_delay_ms.to_string()),
        ("REQUEST_TIMEOUT_SECS".to_string(), "5".to_string()),
    ]);
    Config::from_vars(&vars).expect("test config should load")
}

/// Application state with a capturing exporter, so tests can assert on
/// the spans the service submits.
pub fn traced_state(home_delay_ms: u64) -> (AppState, Arc<CapturingExporter>) {
    let exporter = Arc::new(CapturingExporter::default());
    let state = AppState {
        config: test_config(home_delay_ms),
        registry: MetricRegistry::new().expect("registry should build"),
        tracer: Arc::new(TraceProvider::new(exporter.clone())),
    };
    (state, exporter)
}

/// Application state whose trace provider is unavailable.
pub fn untraced_state(home_delay_ms: u64) -> AppState {
    AppState {
        config: test_config(home_delay_ms),
        registry: MetricRegistry::new().expect("registry should build"),
        tracer: Arc::new(TraceProvider::disabled()),
    }
}
