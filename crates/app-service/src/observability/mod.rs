//! Observability module for the App Service.
//!
//! Provides the metric registry, metric definitions and recording
//! helpers used by the request instrumentation layer.

pub mod metrics;
