//! Metric registry and metric definitions for the App Service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `app_` prefix for this service
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `method`: 7 values max (GET, POST, PATCH, DELETE, PUT, HEAD, OPTIONS)
//! - `endpoint`: known routes plus `/other`
//! - `status`: HTTP status codes actually served
//!
//! # Registry ownership
//!
//! The registry is an explicitly constructed instance held in application
//! state and passed by handle into the request path. It is never
//! installed as the process-global recorder: the recorder built here is
//! the single mutation authority for every bucket, and callers only
//! submit observations through it.

use std::sync::Arc;
use std::time::Duration;

use metrics::{Key, KeyName, Label, Level, Metadata, Recorder, SharedString, Unit};
use metrics_exporter_prometheus::{
    BuildError, Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder,
};
use thiserror::Error;

/// Total requests, labeled by method, endpoint and status.
pub const REQUEST_COUNT: &str = "app_requests_total";

/// Request latency distribution in seconds, labeled by method and endpoint.
pub const REQUEST_LATENCY: &str = "app_request_latency_seconds";

/// Histogram boundaries for request latency, fixed at registration time.
pub const LATENCY_BUCKETS: &[f64] = &[
    0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.500, 5.000, 10.000,
];

static METADATA: Metadata<'static> =
    Metadata::new(module_path!(), Level::INFO, Some(module_path!()));

/// Errors from metric recording and registry construction.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// A negative or otherwise out-of-domain value was offered to a
    /// histogram. The registry state is left unchanged.
    #[error("Invalid measurement: duration must be a non-negative number, got {0}")]
    InvalidMeasurement(f64),

    #[error("Failed to build metrics recorder: {0}")]
    Build(#[from] BuildError),
}

/// Holds the request counter and latency histogram aggregates and renders
/// text snapshots of them on demand.
///
/// Cheap to clone; clones share the underlying recorder.
#[derive(Clone)]
pub struct MetricRegistry {
    recorder: Arc<PrometheusRecorder>,
    handle: PrometheusHandle,
}

impl MetricRegistry {
    /// Build a registry with the service's bucket boundaries and metric
    /// descriptions.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::Build` if the bucket configuration is
    /// rejected by the recorder builder.
    pub fn new() -> Result<Self, MetricsError> {
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(Matcher::Full(REQUEST_LATENCY.to_string()), LATENCY_BUCKETS)?
            .build_recorder();

        recorder.describe_counter(
            KeyName::from_const_str(REQUEST_COUNT),
            None,
            SharedString::const_str("Total requests processed, by method, endpoint and status"),
        );
        recorder.describe_histogram(
            KeyName::from_const_str(REQUEST_LATENCY),
            Some(Unit::Seconds),
            SharedString::const_str("Request latency distribution, by method and endpoint"),
        );

        let handle = recorder.handle();
        Ok(Self {
            recorder: Arc::new(recorder),
            handle,
        })
    }

    /// Add one to the counter bucket for the given label set, creating
    /// the bucket on first use. Always succeeds; concurrent first use
    /// yields exactly one bucket.
    pub fn increment_counter(&self, metric: &'static str, labels: &[(&'static str, String)]) {
        let key = Key::from_parts(metric, to_labels(labels));
        self.recorder.register_counter(&key, &METADATA).increment(1);
    }

    /// Record one observation into the histogram bucket for the given
    /// label set, updating the matching boundary bucket, running sum and
    /// running count atomically.
    ///
    /// # Errors
    ///
    /// `MetricsError::InvalidMeasurement` for negative or non-finite
    /// values; the registry is left unchanged.
    pub fn observe_latency(
        &self,
        metric: &'static str,
        labels: &[(&'static str, String)],
        seconds: f64,
    ) -> Result<(), MetricsError> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(MetricsError::InvalidMeasurement(seconds));
        }

        let key = Key::from_parts(metric, to_labels(labels));
        self.recorder
            .register_histogram(&key, &METADATA)
            .record(seconds);
        Ok(())
    }

    /// Render the current state of every registered metric family in the
    /// Prometheus text exposition format. Safe to call concurrently with
    /// in-flight updates; stable across calls for the same accumulated
    /// state.
    #[must_use]
    pub fn render_snapshot(&self) -> String {
        self.handle.render()
    }
}

impl std::fmt::Debug for MetricRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricRegistry").finish_non_exhaustive()
    }
}

fn to_labels(labels: &[(&'static str, String)]) -> Vec<Label> {
    labels
        .iter()
        .map(|(key, value)| Label::new(*key, value.clone()))
        .collect()
}

/// Record one completed HTTP request into both metric families.
///
/// Requests are metered regardless of outcome; the status code label
/// carries success versus failure. The endpoint label is normalized so
/// unmatched paths cannot explode cardinality.
pub fn record_http_request(
    registry: &MetricRegistry,
    method: &str,
    endpoint: &str,
    status_code: u16,
    duration: Duration,
) {
    let endpoint = normalize_endpoint(endpoint);

    registry.increment_counter(
        REQUEST_COUNT,
        &[
            ("method", method.to_string()),
            ("endpoint", endpoint.clone()),
            ("status", status_code.to_string()),
        ],
    );

    if let Err(error) = registry.observe_latency(
        REQUEST_LATENCY,
        &[("method", method.to_string()), ("endpoint", endpoint)],
        duration.as_secs_f64(),
    ) {
        // An elapsed wall-clock duration is never negative; if a bad
        // value ever shows up the measurement is dropped, not the
        // request.
        tracing::warn!(error = %error, "Failed to record request latency");
    }
}

/// Normalize the endpoint path to the known route set.
///
/// Unknown paths collapse to `/other` to bound label cardinality.
fn normalize_endpoint(path: &str) -> String {
    match path {
        "/" | "/health" | "/metrics" => path.to_string(),
        _ => "/other".to_string(),
    }
}
