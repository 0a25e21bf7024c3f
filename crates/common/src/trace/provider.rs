//! Span factory held explicitly in application state.
//!
//! The provider is constructed once at startup and passed by handle into
//! the request path — there is no process-global tracer registration. A
//! disabled provider yields `TraceError::ContextUnavailable`, which
//! callers downgrade to the sentinel trace id; observability must never
//! degrade the primary service.

use std::sync::Arc;

use thiserror::Error;

use crate::trace::context::SpanContext;
use crate::trace::export::SpanExporter;
use crate::trace::span::SpanGuard;

/// Errors from span creation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TraceError {
    /// Span creation or current-span lookup failed because no provider
    /// backend is available. Recovered locally with the sentinel trace
    /// id; never surfaced to the request caller.
    #[error("trace context provider is not initialized")]
    ContextUnavailable,
}

/// Creates spans and hands their completed records to the exporter.
pub struct TraceProvider {
    exporter: Option<Arc<dyn SpanExporter>>,
}

impl TraceProvider {
    /// Provider backed by an exporter.
    pub fn new(exporter: Arc<dyn SpanExporter>) -> Self {
        Self {
            exporter: Some(exporter),
        }
    }

    /// Provider with no backend. Every `start_span` call reports
    /// `ContextUnavailable`.
    #[must_use]
    pub fn disabled() -> Self {
        Self { exporter: None }
    }

    /// Whether spans can currently be created.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.exporter.is_some()
    }

    /// Open a scoped span.
    ///
    /// With a parent context the new span inherits the parent's trace id
    /// and records the parent's span id; without one it starts a fresh
    /// trace. The returned guard submits the completed record to the
    /// exporter exactly once, when released.
    ///
    /// # Errors
    ///
    /// `TraceError::ContextUnavailable` when the provider is disabled.
    pub fn start_span(
        &self,
        name: &str,
        parent: Option<&SpanContext>,
    ) -> Result<SpanGuard, TraceError> {
        let exporter = self
            .exporter
            .as_ref()
            .ok_or(TraceError::ContextUnavailable)?
            .clone();

        let context = match parent {
            Some(parent) => SpanContext::child_of(parent),
            None => SpanContext::root(),
        };

        Ok(SpanGuard::open(name, context, exporter))
    }
}

impl std::fmt::Debug for TraceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceProvider")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
