//! Test utilities for consumers of the observability stack.
//!
//! Gated behind the `test-utils` feature (and visible to this crate's own
//! unit tests) so production builds of consumer services do not carry
//! test-only surface.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::trace::export::{SpanExporter, SpanTransport};
use crate::trace::span::SpanRecord;

/// Exporter that retains every submitted span for assertions.
#[derive(Debug, Default)]
pub struct CapturingExporter {
    records: Mutex<Vec<SpanRecord>>,
}

impl CapturingExporter {
    /// All spans submitted so far, in submission order.
    pub fn records(&self) -> Vec<SpanRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SpanExporter for CapturingExporter {
    fn submit(&self, span: SpanRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(span);
    }
}

/// Transport that retains every flushed batch for assertions.
#[derive(Debug, Default)]
pub struct CapturingTransport {
    batches: Mutex<Vec<Vec<SpanRecord>>>,
}

impl CapturingTransport {
    /// All batches flushed so far, in flush order.
    pub fn batches(&self) -> Vec<Vec<SpanRecord>> {
        self.batches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Poll until at least `count` spans have been flushed or `timeout`
    /// elapses. Assertions belong to the caller; this only waits.
    pub async fn wait_for_spans(&self, count: usize, timeout: Duration) {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let total: usize = self.batches().iter().map(Vec::len).sum();
            if total >= count || tokio::time::Instant::now() >= deadline {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl SpanTransport for CapturingTransport {
    async fn send_batch(&self, batch: Vec<SpanRecord>) {
        self.batches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(batch);
    }
}

/// Assertion helper over a rendered Prometheus snapshot.
///
/// Parses `metric{label="value",...} value` sample lines so tests can
/// assert on individual buckets without depending on label order or on
/// the surrounding `# TYPE`/`# HELP` commentary.
#[derive(Debug, Clone)]
pub struct MetricAssertion {
    rendered: String,
}

impl MetricAssertion {
    pub fn new(rendered: impl Into<String>) -> Self {
        Self {
            rendered: rendered.into(),
        }
    }

    /// The value of the sample with exactly the given label set, if present.
    pub fn sample(&self, metric: &str, labels: &[(&str, &str)]) -> Option<f64> {
        let mut expected: Vec<(String, String)> = labels
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        expected.sort();

        self.rendered.lines().find_map(|line| {
            let (name, mut found, value) = parse_sample(line)?;
            found.sort();
            (name == metric && found == expected).then_some(value)
        })
    }

    /// Counter value for the label set, defaulting to zero when the
    /// bucket does not exist yet.
    pub fn counter(&self, metric: &str, labels: &[(&str, &str)]) -> f64 {
        self.sample(metric, labels).unwrap_or(0.0)
    }

    /// Cumulative observation count of a histogram family.
    pub fn histogram_count(&self, metric: &str, labels: &[(&str, &str)]) -> f64 {
        self.sample(&format!("{metric}_count"), labels)
            .unwrap_or(0.0)
    }

    /// Running sum of a histogram family.
    pub fn histogram_sum(&self, metric: &str, labels: &[(&str, &str)]) -> f64 {
        self.sample(&format!("{metric}_sum"), labels).unwrap_or(0.0)
    }

    /// True when the snapshot carries no sample lines at all (comments
    /// and blank lines are permitted).
    pub fn is_empty(&self) -> bool {
        self.rendered
            .lines()
            .all(|line| line.is_empty() || line.starts_with('#'))
    }
}

/// Parse one exposition line into (metric name, labels, value).
fn parse_sample(line: &str) -> Option<(&str, Vec<(String, String)>, f64)> {
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    if let Some((name, rest)) = line.split_once('{') {
        let (labels_part, value_part) = rest.split_once('}')?;
        let labels = labels_part
            .split(',')
            .filter(|pair| !pair.is_empty())
            .map(parse_label)
            .collect::<Option<Vec<_>>>()?;
        let value = value_part.trim().parse().ok()?;
        Some((name, labels, value))
    } else {
        let (name, value_part) = line.split_once(' ')?;
        let value = value_part.trim().parse().ok()?;
        Some((name, Vec::new(), value))
    }
}

fn parse_label(pair: &str) -> Option<(String, String)> {
    let (key, quoted) = pair.split_once('=')?;
    let value = quoted.strip_prefix('"')?.strip_suffix('"')?;
    Some((key.trim().to_string(), value.to_string()))
}
