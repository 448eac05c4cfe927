//! Diagnostics bus for publishing tracker activity

use super::{DiagnosticRecord, DiagnosticSubscriber, TrackerDiagnostic};
use chrono::Utc;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error};

const DEFAULT_CAPACITY: usize = 256;

/// Fans diagnostics out to registered subscribers and broadcast receivers
pub struct DiagnosticsBus {
    sender: broadcast::Sender<DiagnosticRecord>,
    subscribers: RwLock<Vec<Arc<dyn DiagnosticSubscriber>>>,
}

impl DiagnosticsBus {
    /// Create a new bus with the given broadcast capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Add a subscriber
    pub fn add_subscriber(&self, subscriber: Arc<dyn DiagnosticSubscriber>) {
        debug!(subscriber = subscriber.name(), "Diagnostic subscriber added");
        self.subscribers.write().push(subscriber);
    }

    /// Remove a subscriber by name
    pub fn remove_subscriber(&self, name: &str) -> bool {
        let mut subscribers = self.subscribers.write();
        let initial_len = subscribers.len();
        subscribers.retain(|s| s.name() != name);
        subscribers.len() != initial_len
    }

    /// Get the number of registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Receiver for async consumers; lagging receivers lose old records
    pub fn subscribe(&self) -> broadcast::Receiver<DiagnosticRecord> {
        self.sender.subscribe()
    }

    /// Publish a diagnostic for the given tracker namespace
    pub fn publish(&self, namespace: &str, diagnostic: TrackerDiagnostic) {
        let record = DiagnosticRecord {
            namespace: namespace.to_string(),
            timestamp: Utc::now(),
            diagnostic,
        };

        // No receivers is the common case
        let _ = self.sender.send(record.clone());

        let subscribers = self.subscribers.read();
        for subscriber in subscribers
            .iter()
            .filter(|s| s.is_interested(&record.diagnostic))
        {
            if let Err(e) = subscriber.handle(&record) {
                error!(
                    subscriber = subscriber.name(),
                    error = %e,
                    "Diagnostic subscriber failed to handle record"
                );
            }
        }
    }
}

impl Default for DiagnosticsBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for DiagnosticsBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticsBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
