//! Watchtower App Service
//!
//! An HTTP service instrumented for production observability: every
//! request is counted, timed, traced and correlated with structured log
//! output. The instrumentation core lives in `middleware` (per-request
//! wrapper) and `observability` (metric registry); the trace context
//! model and span export pipeline are shared via the `common` crate.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod routes;
