//! Distributed trace context and span export for Watchtower services.
//!
//! The model is deliberately small: a request opens a span, the span's
//! context (trace id, span id, parent) flows to any child work, and the
//! completed span record is handed to an exporter when the scoped handle
//! is released. The exporter side is a seam — the bundled implementations
//! batch records and hand them to a transport, and a real collector
//! transport can be plugged in without touching the request path.
//!
//! # Components
//!
//! - `context` - trace/span identifiers and parent linkage
//! - `span` - scoped span handles and completed-span records
//! - `provider` - explicit span factory held in application state
//! - `export` - exporter interfaces and the batching pipeline

pub mod context;
pub mod export;
pub mod provider;
pub mod span;

pub use context::{SpanContext, SpanId, TraceId};
pub use export::{BatchConfig, BatchExporter, BatchWorker, LogTransport, NoopExporter, SpanExporter, SpanTransport};
pub use provider::{TraceError, TraceProvider};
pub use span::{current_trace_id_hex, SpanGuard, SpanRecord, TRACE_ID_NONE};
