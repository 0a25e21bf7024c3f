//! App Service
//!
//! Entry point for the Watchtower instrumented HTTP service.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app_service::config::Config;
use app_service::observability::metrics::MetricRegistry;
use app_service::routes::{self, AppState};
use common::trace::{BatchConfig, BatchExporter, BatchWorker, LogTransport, TraceProvider};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "app_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting App Service");

    let config = Config::from_env().context("failed to load configuration")?;

    info!(
        bind_address = %config.bind_address,
        tracing_enabled = config.tracing_enabled,
        home_delay_ms = config.home_delay_ms,
        "Configuration loaded successfully"
    );

    // Metric registry: constructed once here, passed by handle into the
    // request path, torn down with the process.
    let registry = MetricRegistry::new().context("failed to build metric registry")?;

    let (tracer, span_worker) = build_trace_pipeline(&config);

    let bind_address = config.bind_address.clone();
    let state = AppState {
        config,
        registry,
        tracer,
    };

    let app = routes::build_routes(state);

    let addr: SocketAddr = bind_address
        .parse()
        .with_context(|| format!("invalid bind address: {bind_address}"))?;

    info!("App Service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Flush spans accepted before the listener drained.
    if let Some(worker) = span_worker {
        worker.shutdown().await;
    }

    info!("App Service shutdown complete");

    Ok(())
}

/// Assemble the span export pipeline.
///
/// With tracing disabled the provider reports `ContextUnavailable` and
/// requests carry the sentinel trace id; the service itself is
/// unaffected.
fn build_trace_pipeline(config: &Config) -> (Arc<TraceProvider>, Option<BatchWorker>) {
    if !config.tracing_enabled {
        warn!("Tracing disabled; requests will log the sentinel trace id");
        return (Arc::new(TraceProvider::disabled()), None);
    }

    let (exporter, worker) = BatchExporter::spawn(
        Arc::new(LogTransport),
        BatchConfig {
            queue_capacity: config.span_queue_capacity,
            batch_size: config.span_batch_size,
            flush_interval: Duration::from_millis(config.span_flush_interval_ms),
        },
    );

    (
        Arc::new(TraceProvider::new(Arc::new(exporter))),
        Some(worker),
    )
}

/// Listens for shutdown signals (SIGTERM, SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
