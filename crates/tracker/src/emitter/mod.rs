//! Buffered, batching delivery of tracked events
//!
//! `enqueue` is a constant-time push under a short lock. `flush` spawns a
//! worker on the tokio runtime and returns immediately; the worker drains the
//! queue in FIFO order, one batch at a time. A batch that fails with a
//! transient error goes back to the head of the queue and is retried with
//! exponential backoff; once its retry budget is spent it is dropped and a
//! [`TrackerDiagnostic::BatchDropped`] is published. Errors never escape the
//! worker.

pub mod queue;
pub mod transport;
pub mod wire;

use self::queue::EventQueue;
use self::transport::{PostRequest, Transport};
use self::wire::{encode_batch, WireSettings};
use std::sync::Arc;
use std::time::Duration;
use surfside_config::EmitterConfig;
use surfside_core::{DiagnosticsBus, Error, Result, TrackedEvent, TrackerDiagnostic};
use surfside_utils::RetryConfig;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use url::Url;

/// Outcome of one flush
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub batches_sent: usize,
    pub events_delivered: usize,
    pub events_dropped: usize,
    pub retries: usize,
}

impl FlushReport {
    fn absorb(&mut self, other: FlushReport) {
        self.batches_sent += other.batches_sent;
        self.events_delivered += other.events_delivered;
        self.events_dropped += other.events_dropped;
        self.retries += other.retries;
    }
}

/// Handle to a flush in progress
///
/// Dropping the handle does not cancel the flush.
#[derive(Debug)]
pub struct FlushHandle {
    task: Option<JoinHandle<FlushReport>>,
}

impl FlushHandle {
    fn noop() -> Self {
        Self { task: None }
    }

    /// True when there was nothing to send and no worker was started
    pub fn is_noop(&self) -> bool {
        self.task.is_none()
    }

    /// Wait for the flush to finish
    pub async fn wait(self) -> FlushReport {
        match self.task {
            None => FlushReport::default(),
            Some(task) => match task.await {
                Ok(report) => report,
                Err(e) => {
                    error!(error = %e, "Flush worker did not complete");
                    FlushReport::default()
                }
            },
        }
    }
}

struct EmitterInner {
    namespace: String,
    url: Url,
    config: EmitterConfig,
    retry: RetryConfig,
    wire: WireSettings,
    queue: EventQueue,
    transport: Arc<dyn Transport>,
    diagnostics: Arc<DiagnosticsBus>,
    flush_lock: tokio::sync::Mutex<()>,
    runtime: Handle,
}

/// Queue plus delivery worker for one tracker
///
/// Cloning yields another handle to the same queue.
#[derive(Clone)]
pub struct Emitter {
    inner: Arc<EmitterInner>,
}

impl std::fmt::Debug for Emitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("namespace", &self.inner.namespace)
            .field("url", &self.inner.url.as_str())
            .field("transport", &self.inner.transport.name())
            .field("pending", &self.pending())
            .finish()
    }
}

impl Emitter {
    /// Create an emitter bound to the current tokio runtime
    pub fn new(
        namespace: impl Into<String>,
        url: Url,
        config: EmitterConfig,
        wire: WireSettings,
        transport: Arc<dyn Transport>,
        diagnostics: Arc<DiagnosticsBus>,
    ) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| {
            Error::configuration("the emitter must be created inside a tokio runtime")
        })?;
        let retry = config.retry_config();
        Ok(Self {
            inner: Arc::new(EmitterInner {
                namespace: namespace.into(),
                url,
                queue: EventQueue::new(config.queue_capacity),
                retry,
                config,
                wire,
                transport,
                diagnostics,
                flush_lock: tokio::sync::Mutex::new(()),
                runtime,
            }),
        })
    }

    /// Replace the retry policy's classification and timing wholesale
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.retry = retry;
        }
        self
    }

    /// Queue an event; returns the number of pending events afterwards
    pub fn enqueue(&self, event: TrackedEvent) -> usize {
        if let Some(evicted) = self.inner.queue.push(event) {
            warn!(
                namespace = %self.inner.namespace,
                event_id = %evicted.id(),
                "Event queue full, dropping oldest event"
            );
            self.inner.diagnostics.publish(
                &self.inner.namespace,
                TrackerDiagnostic::BatchDropped {
                    events: 1,
                    error: "event queue full".to_string(),
                },
            );
        }
        self.inner.queue.len()
    }

    pub fn pending(&self) -> usize {
        self.inner.queue.len()
    }

    /// Pending events, oldest first
    pub fn pending_events(&self) -> Vec<TrackedEvent> {
        self.inner.queue.snapshot()
    }

    pub fn url(&self) -> &Url {
        &self.inner.url
    }

    /// Start delivering everything pending; never blocks the caller
    pub fn flush(&self) -> FlushHandle {
        if self.inner.queue.is_empty() {
            debug!(namespace = %self.inner.namespace, "Flush requested with empty queue");
            return FlushHandle::noop();
        }
        let inner = Arc::clone(&self.inner);
        FlushHandle {
            task: Some(self.inner.runtime.spawn(async move { inner.drain().await })),
        }
    }
}

impl EmitterInner {
    async fn drain(&self) -> FlushReport {
        let _guard = self.flush_lock.lock().await;
        let pending = self.queue.len();
        if pending == 0 {
            return FlushReport::default();
        }
        self.diagnostics
            .publish(&self.namespace, TrackerDiagnostic::FlushStarted { pending });

        let mut report = FlushReport::default();
        loop {
            let batch = self.queue.take_front(self.config.batch_size);
            if batch.is_empty() {
                break;
            }
            report.absorb(self.deliver(batch).await);
        }

        info!(
            namespace = %self.namespace,
            delivered = report.events_delivered,
            dropped = report.events_dropped,
            batches = report.batches_sent,
            "Flush complete"
        );
        report
    }

    /// Send one batch, requeueing it at the head between attempts
    async fn deliver(&self, mut batch: Vec<TrackedEvent>) -> FlushReport {
        let mut report = FlushReport::default();
        let mut backoff = self.retry.backoff();
        let size = batch.len();

        loop {
            match self.send(&batch).await {
                Ok(()) => {
                    let attempts = backoff.failures() + 1;
                    self.diagnostics.publish(
                        &self.namespace,
                        TrackerDiagnostic::BatchDelivered {
                            events: size,
                            attempts,
                        },
                    );
                    report.batches_sent += 1;
                    report.events_delivered += size;
                    return report;
                }
                Err(e) => match backoff.next_delay(&e) {
                    Some(delay) => {
                        report.retries += 1;
                        report.events_dropped +=
                            self.retry_later(batch, backoff.failures(), delay, &e);
                        tokio::time::sleep(delay).await;
                        batch = self.queue.take_front(size);
                    }
                    None => {
                        error!(
                            namespace = %self.namespace,
                            events = size,
                            attempts = backoff.failures(),
                            error = %e,
                            "Dropping batch"
                        );
                        self.diagnostics.publish(
                            &self.namespace,
                            TrackerDiagnostic::BatchDropped {
                                events: size,
                                error: e.to_string(),
                            },
                        );
                        report.events_dropped += size;
                        return report;
                    }
                },
            }
        }
    }

    /// Requeue a failed batch; returns how many queued events it displaced
    fn retry_later(
        &self,
        batch: Vec<TrackedEvent>,
        attempt: u32,
        delay: Duration,
        error: &Error,
    ) -> usize {
        let events = batch.len();
        let evicted = self.queue.requeue_front(batch).len();
        if evicted > 0 {
            warn!(
                namespace = %self.namespace,
                evicted,
                "Event queue full after requeue, dropping events behind the batch"
            );
            self.diagnostics.publish(
                &self.namespace,
                TrackerDiagnostic::BatchDropped {
                    events: evicted,
                    error: "event queue full".to_string(),
                },
            );
        }
        self.diagnostics.publish(
            &self.namespace,
            TrackerDiagnostic::BatchRetrying {
                events,
                attempt,
                delay,
                error: error.to_string(),
            },
        );
        evicted
    }

    async fn send(&self, batch: &[TrackedEvent]) -> Result<()> {
        let request = PostRequest {
            url: self.url.clone(),
            body: encode_batch(batch, &self.wire)?,
            event_count: batch.len(),
        };
        let timeout = self.config.request_timeout;
        match tokio::time::timeout(timeout, self.transport.send(&request)).await {
            Ok(result) => result,
            Err(_) => Err(Error::timeout(format!("POST {}", self.url), timeout)),
        }
    }
}
