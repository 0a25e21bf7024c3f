//! Scoped span handles and completed-span records.
//!
//! A `SpanGuard` is the acquire/release pair for one unit of traced work:
//! acquisition happens in `TraceProvider::start_span`, release happens on
//! `end()` or on drop. Release transitions the span OPEN → CLOSED exactly
//! once and submits the immutable `SpanRecord` to the exporter; a guard
//! that was already released does nothing on drop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::trace::context::SpanContext;
use crate::trace::export::SpanExporter;

/// Sentinel trace id rendering used when no span is active.
pub const TRACE_ID_NONE: &str = "none";

/// An immutable record of a completed span, handed to the exporter.
#[derive(Debug, Clone, Serialize)]
pub struct SpanRecord {
    /// Human-readable operation name, e.g. `GET /` or `home-endpoint`.
    pub name: String,
    /// Correlation context for this span.
    pub context: SpanContext,
    /// Wall-clock start of the span.
    pub started_at: DateTime<Utc>,
    /// Elapsed time between acquisition and release.
    pub duration: Duration,
}

/// Scoped handle for an open span.
///
/// Holding the guard keeps the span open; releasing it (explicitly via
/// [`SpanGuard::end`], or implicitly when the guard is dropped on an error
/// or cancellation path) closes the span and forwards the completed record
/// to the exporter.
pub struct SpanGuard {
    // `Some` while OPEN; taken exactly once on release.
    record: Option<SpanRecord>,
    started: Instant,
    exporter: Arc<dyn SpanExporter>,
}

impl SpanGuard {
    pub(crate) fn open(name: &str, context: SpanContext, exporter: Arc<dyn SpanExporter>) -> Self {
        Self {
            record: Some(SpanRecord {
                name: name.to_string(),
                context,
                started_at: Utc::now(),
                duration: Duration::ZERO,
            }),
            started: Instant::now(),
            exporter,
        }
    }

    /// The span's context, or `None` once the guard has been released.
    #[must_use]
    pub fn context(&self) -> Option<SpanContext> {
        self.record.as_ref().map(|record| record.context)
    }

    /// Canonical hex trace id for this span, or the sentinel once released.
    #[must_use]
    pub fn trace_id_hex(&self) -> String {
        self.record
            .as_ref()
            .map_or_else(|| TRACE_ID_NONE.to_string(), |record| record.context.trace_id_hex())
    }

    /// Explicitly close the span on the normal exit path.
    pub fn end(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(mut record) = self.record.take() {
            record.duration = self.started.elapsed();
            self.exporter.submit(record);
        }
    }
}

impl Drop for SpanGuard {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for SpanGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpanGuard")
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}

/// Best-effort trace id extraction from an optional span handle.
///
/// Returns the sentinel rather than failing when no span is active, so
/// log correlation can never abort a request.
#[must_use]
pub fn current_trace_id_hex(span: Option<&SpanGuard>) -> String {
    span.map_or_else(|| TRACE_ID_NONE.to_string(), SpanGuard::trace_id_hex)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::testing::CapturingExporter;
    use crate::trace::provider::TraceProvider;

    #[test]
    fn test_end_submits_exactly_one_record() {
        let exporter = Arc::new(CapturingExporter::default());
        let provider = TraceProvider::new(exporter.clone());

        let span = provider.start_span("unit-of-work", None).unwrap();
        span.end();

        let records = exporter.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "unit-of-work");
    }

    #[test]
    fn test_drop_submits_exactly_one_record() {
        let exporter = Arc::new(CapturingExporter::default());
        let provider = TraceProvider::new(exporter.clone());

        {
            let _span = provider.start_span("dropped-on-early-exit", None).unwrap();
            // Early exit path: the guard goes out of scope unreleased.
        }

        assert_eq!(exporter.records().len(), 1);
    }

    #[test]
    fn test_release_is_not_duplicated_by_drop_after_end() {
        let exporter = Arc::new(CapturingExporter::default());
        let provider = TraceProvider::new(exporter.clone());

        let span = provider.start_span("once", None).unwrap();
        span.end();
        // `end` consumed the guard; its drop already ran and must not have
        // exported a second record.
        assert_eq!(exporter.records().len(), 1);
    }

    #[test]
    fn test_record_duration_covers_the_open_interval() {
        let exporter = Arc::new(CapturingExporter::default());
        let provider = TraceProvider::new(exporter.clone());

        let span = provider.start_span("timed", None).unwrap();
        std::thread::sleep(Duration::from_millis(20));
        span.end();

        let records = exporter.records();
        assert!(records[0].duration >= Duration::from_millis(20));
    }

    #[test]
    fn test_trace_id_hex_matches_context() {
        let exporter = Arc::new(CapturingExporter::default());
        let provider = TraceProvider::new(exporter);

        let span = provider.start_span("hex", None).unwrap();
        let ctx = span.context().unwrap();
        assert_eq!(span.trace_id_hex(), ctx.trace_id.to_hex());
        assert_eq!(span.trace_id_hex().len(), 32);
    }

    #[test]
    fn test_current_trace_id_hex_without_span_is_sentinel() {
        assert_eq!(current_trace_id_hex(None), TRACE_ID_NONE);
    }

    #[test]
    fn test_current_trace_id_hex_with_span() {
        let exporter = Arc::new(CapturingExporter::default());
        let provider = TraceProvider::new(exporter);

        let span = provider.start_span("active", None).unwrap();
        let rendered = current_trace_id_hex(Some(&span));
        assert_ne!(rendered, TRACE_ID_NONE);
        assert_eq!(rendered.len(), 32);
    }

    #[test]
    fn test_child_span_record_links_to_parent() {
        let exporter = Arc::new(CapturingExporter::default());
        let provider = TraceProvider::new(exporter.clone());

        let parent = provider.start_span("parent", None).unwrap();
        let parent_ctx = parent.context().unwrap();
        let child = provider
            .start_span("child", Some(&parent_ctx))
            .unwrap();
        child.end();
        parent.end();

        let records = exporter.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "child");
        assert_eq!(records[0].context.trace_id, parent_ctx.trace_id);
        assert_eq!(records[0].context.parent_span_id, Some(parent_ctx.span_id));
        assert_eq!(records[1].name, "parent");
    }
}
