//! Observability channel for tracker activity
//!
//! The tracker never calls back into its host except through this module.
//! Diagnostics are fire-and-forget: publishing never blocks on, or fails
//! because of, a subscriber.

mod bus;
pub mod log_lines;
pub mod tracing_sink;

pub use bus::DiagnosticsBus;
pub use log_lines::LogLineSubscriber;
pub use tracing_sink::TracingSubscriber;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Things the tracker reports about itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrackerDiagnostic {
    /// Tracker created and bound to a collector
    Initialized { endpoint: String },
    /// A context value was replaced, or a product appended
    ContextUpdated { context: String, summary: String },
    /// Event accepted and queued
    EventTracked {
        event_id: String,
        schema: String,
        queued: usize,
    },
    /// Event refused at `track` time
    EventRejected { reason: String },
    /// A flush picked up pending events
    FlushStarted { pending: usize },
    /// A batch reached the collector
    BatchDelivered { events: usize, attempts: u32 },
    /// A batch failed and was put back at the head of the queue
    BatchRetrying {
        events: usize,
        attempt: u32,
        delay: Duration,
        error: String,
    },
    /// A batch exhausted its retries and was discarded
    BatchDropped { events: usize, error: String },
}

impl TrackerDiagnostic {
    /// Failures worth surfacing even at low verbosity
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            TrackerDiagnostic::EventRejected { .. }
                | TrackerDiagnostic::BatchRetrying { .. }
                | TrackerDiagnostic::BatchDropped { .. }
        )
    }
}

/// A diagnostic stamped with its origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    pub namespace: String,
    pub timestamp: DateTime<Utc>,
    pub diagnostic: TrackerDiagnostic,
}

/// Receives diagnostics synchronously on the publishing thread
pub trait DiagnosticSubscriber: Send + Sync {
    /// Handle a diagnostic
    fn handle(
        &self,
        record: &DiagnosticRecord,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Subscriber name for debugging
    fn name(&self) -> &'static str;

    /// Check if subscriber is interested in this diagnostic
    fn is_interested(&self, _diagnostic: &TrackerDiagnostic) -> bool {
        true
    }
}
