//! Forwards diagnostics to `tracing`

use super::log_lines::describe;
use super::{DiagnosticRecord, DiagnosticSubscriber};
use tracing::{debug, warn};

/// Logs every diagnostic, failures at warn level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSubscriber;

impl DiagnosticSubscriber for TracingSubscriber {
    fn handle(
        &self,
        record: &DiagnosticRecord,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let message = describe(&record.diagnostic);
        if record.diagnostic.is_failure() {
            warn!(namespace = %record.namespace, "{message}");
        } else {
            debug!(namespace = %record.namespace, "{message}");
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "tracing"
    }
}
