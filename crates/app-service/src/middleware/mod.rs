//! Middleware for the App Service.
//!
//! # Components
//!
//! - `instrument` - per-request instrumentation wrapper (tracing, log
//!   correlation, metrics)

pub mod instrument;

pub use instrument::{instrument_request, CurrentSpan, TRACE_ID_HEADER};
