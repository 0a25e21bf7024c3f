//! Span export interfaces and the batching pipeline.
//!
//! The request path only ever calls [`SpanExporter::submit`], which must
//! not block. [`BatchExporter`] implements it with a bounded queue
//! drained by a background worker; the worker forwards batches to a
//! [`SpanTransport`], the seam where a real collector client would sit.
//! When the queue is full the span is dropped — trace data is best-effort
//! and a slow or absent collector must never stall a request.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::trace::span::SpanRecord;

/// Receives completed spans from released span guards.
pub trait SpanExporter: Send + Sync {
    /// Submit one completed span. Must be non-blocking and infallible
    /// from the caller's point of view; implementations absorb their own
    /// failures.
    fn submit(&self, span: SpanRecord);
}

/// Exporter that discards every span. Used when tracing is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopExporter;

impl SpanExporter for NoopExporter {
    fn submit(&self, _span: SpanRecord) {}
}

/// Destination for batches of completed spans.
///
/// Implementations own the wire protocol and endpoint configuration. The
/// bundled [`LogTransport`] writes batches to the log stream; a collector
/// client (OTLP, Jaeger agent, ...) would implement this trait instead.
#[async_trait]
pub trait SpanTransport: Send + Sync {
    async fn send_batch(&self, batch: Vec<SpanRecord>);
}

/// Transport that emits each batch as a JSON payload at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTransport;

#[async_trait]
impl SpanTransport for LogTransport {
    async fn send_batch(&self, batch: Vec<SpanRecord>) {
        match serde_json::to_string(&batch) {
            Ok(payload) => {
                tracing::debug!(spans = batch.len(), payload = %payload, "exporting span batch");
            }
            Err(error) => {
                tracing::warn!(error = %error, "failed to serialize span batch");
            }
        }
    }
}

/// Tuning for the batch pipeline.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Bounded queue size between request tasks and the worker.
    pub queue_capacity: usize,
    /// Batch is flushed as soon as it reaches this many spans.
    pub batch_size: usize,
    /// Partial batches are flushed at this interval.
    pub flush_interval: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 2048,
            batch_size: 64,
            flush_interval: Duration::from_secs(5),
        }
    }
}

/// Queue-fronted exporter that batches spans onto a background worker.
#[derive(Debug, Clone)]
pub struct BatchExporter {
    tx: mpsc::Sender<SpanRecord>,
}

/// Handle for the background flush task.
#[derive(Debug)]
pub struct BatchWorker {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl BatchExporter {
    /// Start the pipeline: returns the exporter for span guards and the
    /// worker handle the binary shuts down after the server drains.
    pub fn spawn(
        transport: Arc<dyn SpanTransport>,
        config: BatchConfig,
    ) -> (Self, BatchWorker) {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let token = CancellationToken::new();
        let handle = tokio::spawn(run_worker(rx, transport, config, token.clone()));
        (Self { tx }, BatchWorker { token, handle })
    }
}

impl SpanExporter for BatchExporter {
    fn submit(&self, span: SpanRecord) {
        // Queue full or worker gone: the span is dropped, the request is
        // not. Exporter unavailability never crosses into request
        // handling.
        if let Err(error) = self.tx.try_send(span) {
            tracing::debug!(error = %error, "span export queue unavailable, dropping span");
        }
    }
}

impl BatchWorker {
    /// Stop the worker, flushing everything it has already accepted.
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(error) = self.handle.await {
            tracing::warn!(error = %error, "span export worker terminated abnormally");
        }
    }
}

async fn run_worker(
    mut rx: mpsc::Receiver<SpanRecord>,
    transport: Arc<dyn SpanTransport>,
    config: BatchConfig,
    token: CancellationToken,
) {
    let batch_size = config.batch_size.max(1);
    let mut buffer: Vec<SpanRecord> = Vec::with_capacity(batch_size);
    let mut ticker = tokio::time::interval(config.flush_interval.max(Duration::from_millis(1)));

    loop {
        tokio::select! {
            () = token.cancelled() => break,
            _ = ticker.tick() => {
                if !buffer.is_empty() {
                    transport.send_batch(std::mem::take(&mut buffer)).await;
                }
            }
            received = rx.recv() => {
                match received {
                    Some(span) => {
                        buffer.push(span);
                        if buffer.len() >= batch_size {
                            transport.send_batch(std::mem::take(&mut buffer)).await;
                        }
                    }
                    None => break,
                }
            }
        }
    }

    // Drain spans accepted before shutdown so they are not lost.
    while let Ok(span) = rx.try_recv() {
        buffer.push(span);
    }
    if !buffer.is_empty() {
        transport.send_batch(buffer).await;
    }
}
