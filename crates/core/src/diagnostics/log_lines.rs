//! Collects human-readable, timestamped log lines

use super::{DiagnosticRecord, DiagnosticSubscriber, TrackerDiagnostic};
use parking_lot::Mutex;

/// In-memory log of tracker activity, one line per diagnostic
#[derive(Debug, Default)]
pub struct LogLineSubscriber {
    lines: Mutex<Vec<String>>,
}

impl LogLineSubscriber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a free-form line, stamped like the diagnostic lines
    pub fn push(&self, message: impl AsRef<str>) {
        let timestamp = chrono::Local::now().format("%H:%M:%S");
        self.lines
            .lock()
            .push(format!("[{timestamp}] {}", message.as_ref()));
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Take every collected line, leaving the log empty
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock())
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}

/// One-line description of a diagnostic
pub fn describe(diagnostic: &TrackerDiagnostic) -> String {
    match diagnostic {
        TrackerDiagnostic::Initialized { endpoint } => {
            format!("Tracker initialized, collector: {endpoint}")
        }
        TrackerDiagnostic::ContextUpdated { context, summary } => {
            format!("{context} context updated: {summary}")
        }
        TrackerDiagnostic::EventTracked {
            event_id,
            schema,
            queued,
        } => format!("Tracked {schema} event {event_id} ({queued} queued)"),
        TrackerDiagnostic::EventRejected { reason } => format!("Event rejected: {reason}"),
        TrackerDiagnostic::FlushStarted { pending } => {
            format!("Flushing {pending} pending event(s)")
        }
        TrackerDiagnostic::BatchDelivered { events, attempts } => {
            format!("Delivered batch of {events} event(s) after {attempts} attempt(s)")
        }
        TrackerDiagnostic::BatchRetrying {
            events,
            attempt,
            delay,
            error,
        } => format!(
            "Batch of {events} event(s) failed on attempt {attempt}, retrying in {delay:?}: {error}"
        ),
        TrackerDiagnostic::BatchDropped { events, error } => {
            format!("Dropped batch of {events} event(s): {error}")
        }
    }
}

impl DiagnosticSubscriber for LogLineSubscriber {
    fn handle(
        &self,
        record: &DiagnosticRecord,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let timestamp = record
            .timestamp
            .with_timezone(&chrono::Local)
            .format("%H:%M:%S");
        self.lines
            .lock()
            .push(format!("[{timestamp}] {}", describe(&record.diagnostic)));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log-lines"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticsBus;
    use std::sync::Arc;

    #[test]
    fn test_collects_lines_in_order() {
        let bus = DiagnosticsBus::default();
        let log = Arc::new(LogLineSubscriber::new());
        bus.add_subscriber(log.clone());

        log.push("Starting tracker initialization...");
        bus.publish("iosTracker", TrackerDiagnostic::FlushStarted { pending: 2 });

        let lines = log.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("Starting tracker initialization..."));
        assert!(lines[1].ends_with("Flushing 2 pending event(s)"));
        assert!(lines[1].starts_with('['));

        assert_eq!(log.drain().len(), 2);
        assert!(log.is_empty());
    }
}
