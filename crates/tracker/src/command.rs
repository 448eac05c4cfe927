//! Commands as plain data, applied by an executor
//!
//! Each [`Command`] describes one user action (a button on the demo screen).
//! The [`CommandExecutor`] applies it to the tracker it owns and narrates
//! what happened as timestamped log lines, so the whole flow can be driven
//! and asserted on without any UI.

use crate::emitter::transport::Transport;
use crate::emitter::FlushHandle;
use crate::lifecycle::TrackerLifecycle;
use crate::tracker::Tracker;
use std::sync::Arc;
use surfside_config::TrackerConfig;
use surfside_core::diagnostics::LogLineSubscriber;
use surfside_core::{
    DiagnosticsBus, Error, Location, Payload, Product, Result, Segment, Source, TrackingId,
    DEBUG_EVENT_SCHEMA, LINK_CLICK_SCHEMA,
};
use tracing::{debug, instrument};

#[allow(clippy::large_enum_variant)]
#[derive(Debug, Clone)]
pub enum Command {
    Initialize(TrackerConfig),
    TrackScreenView { name: String },
    TrackLinkClick { target_url: String },
    /// Arbitrary self-describing event
    TrackEvent { schema: String, payload: Payload },
    /// Track a test event and force a flush
    DebugFlow,
    SetLocation(Location),
    SetSource(Source),
    SetSegment(Segment),
    AddProduct(Product),
    SetCommerceAction(String),
    Flush,
    /// Add the product, then fire `detail`
    ViewProduct(Product),
    /// Add the product, then fire `purchase`
    Purchase(Product),
    ClearLogs,
}

impl Command {
    /// Operation name used in logs and `NotInitialized` errors
    pub fn name(&self) -> &'static str {
        match self {
            Command::Initialize(_) => "initialize",
            Command::TrackScreenView { .. } => "track_screen_view",
            Command::TrackLinkClick { .. } => "track_link_click",
            Command::TrackEvent { .. } => "track_event",
            Command::DebugFlow => "debug_flow",
            Command::SetLocation(_) => "set_location",
            Command::SetSource(_) => "set_source",
            Command::SetSegment(_) => "set_segment",
            Command::AddProduct(_) => "add_product",
            Command::SetCommerceAction(_) => "set_commerce_action",
            Command::Flush => "flush",
            Command::ViewProduct(_) => "view_product",
            Command::Purchase(_) => "purchase",
            Command::ClearLogs => "clear_logs",
        }
    }

    /// Every button of the demo screen, in order
    pub fn demo_sequence(config: TrackerConfig) -> Result<Vec<Command>> {
        Ok(vec![
            Command::Initialize(config),
            Command::SetLocation(Location::new(
                "37.7749",
                "-122.4194",
                "US",
                "CA",
                "San Francisco",
            )?),
            Command::TrackScreenView {
                name: "Home".into(),
            },
            Command::TrackLinkClick {
                target_url: "https://example.com".into(),
            },
            Command::SetLocation(Location::new("40.7128", "-74.0060", "US", "NY", "New York")?),
            Command::SetSource(Source::new("updated-account-123", "updated-source-456")?),
            Command::SetSegment(Segment::new("premium-users", "1")?),
            Command::ViewProduct(
                Product::builder("P12345")
                    .name("Premium Product")
                    .price(29.99)
                    .quantity(2)
                    .build()?,
            ),
            Command::Purchase(
                Product::builder("demo-product-123")
                    .name("Sample Product")
                    .list("featured-products")
                    .brand("Demo Brand")
                    .category("Electronics")
                    .variant("Blue")
                    .price(29.99)
                    .quantity(1)
                    .coupon("SAVE10")
                    .position(1)
                    .currency("USD")
                    .build()?,
            ),
            Command::DebugFlow,
        ])
    }
}

/// Result of applying one command
#[derive(Debug, Default)]
pub struct CommandOutcome {
    /// Id of the event tracked by the command, if any
    pub tracking_id: Option<TrackingId>,
    /// Flush started by the command; `None` when nothing was queued
    pub flush: Option<FlushHandle>,
    /// Log lines produced while applying the command
    pub lines: Vec<String>,
}

impl CommandOutcome {
    /// Wait for the flush, if one was started
    pub async fn wait(&mut self) {
        if let Some(flush) = self.flush.take() {
            flush.wait().await;
        }
    }
}

/// Owns the tracker lifecycle and applies commands to it
///
/// Every diagnostic the tracker publishes is also collected as a log line.
/// When a command fails, the lines produced so far stay in [`Self::log`].
pub struct CommandExecutor {
    lifecycle: TrackerLifecycle,
    log: Arc<LogLineSubscriber>,
    diagnostics: Arc<DiagnosticsBus>,
    transport: Option<Arc<dyn Transport>>,
}

impl std::fmt::Debug for CommandExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandExecutor")
            .field("lifecycle", &self.lifecycle)
            .field("log_lines", &self.log.len())
            .finish()
    }
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new(Arc::new(DiagnosticsBus::default()))
    }
}

impl CommandExecutor {
    pub fn new(diagnostics: Arc<DiagnosticsBus>) -> Self {
        let log = Arc::new(LogLineSubscriber::new());
        diagnostics.add_subscriber(log.clone());
        Self {
            lifecycle: TrackerLifecycle::new(),
            log,
            diagnostics,
            transport: None,
        }
    }

    /// Deliver through this transport instead of HTTP
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn lifecycle(&self) -> &TrackerLifecycle {
        &self.lifecycle
    }

    pub fn log(&self) -> &Arc<LogLineSubscriber> {
        &self.log
    }

    #[instrument(skip_all, fields(command = command.name()))]
    pub fn execute(&mut self, command: Command) -> Result<CommandOutcome> {
        let operation = command.name();
        let result = self.apply(command);
        if let Err(e) = &result {
            debug!(operation, error = %e, "Command failed");
            self.log.push(format!("Error: {e}"));
        }
        let mut outcome = result?;
        outcome.lines = self.log.drain();
        Ok(outcome)
    }

    fn apply(&mut self, command: Command) -> Result<CommandOutcome> {
        let operation = command.name();
        match command {
            Command::Initialize(config) => self.initialize(config),
            Command::ClearLogs => {
                self.log.clear();
                Ok(CommandOutcome::default())
            }
            Command::TrackScreenView { name } => {
                let tracker = self.lifecycle.tracker(operation)?;
                self.log.push(format!("Tracking screen view '{name}'..."));
                let id = tracker.track_screen_view(name)?;
                Ok(flushed(tracker, Some(id)))
            }
            Command::TrackLinkClick { target_url } => {
                let tracker = self.lifecycle.tracker(operation)?;
                url::Url::parse(&target_url)
                    .map_err(|e| Error::validation("targetUrl", e.to_string()))?;
                self.log.push(format!("Tracking link click to {target_url}"));
                let payload = Payload::new().with("targetUrl", target_url);
                let id = tracker.track_self_describing(LINK_CLICK_SCHEMA, payload)?;
                Ok(flushed(tracker, Some(id)))
            }
            Command::TrackEvent { schema, payload } => {
                let tracker = self.lifecycle.tracker(operation)?;
                let id = tracker.track_self_describing(&schema, payload)?;
                Ok(flushed(tracker, Some(id)))
            }
            Command::DebugFlow => {
                let tracker = self.lifecycle.tracker(operation)?;
                self.log
                    .push(format!("Debug: tracker namespace {}", tracker.namespace()));
                let timestamp = chrono::Utc::now().timestamp_millis() as f64 / 1000.0;
                let payload = Payload::new()
                    .with("test", "debug_flow")
                    .with("timestamp", timestamp);
                let id = tracker.track_self_describing(DEBUG_EVENT_SCHEMA, payload)?;
                self.log.push("Debug: forcing flush");
                Ok(flushed(tracker, Some(id)))
            }
            Command::SetLocation(location) => {
                let tracker = self.lifecycle.tracker_mut(operation)?;
                tracker.set_location(location)?;
                Ok(flushed(tracker, None))
            }
            Command::SetSource(source) => {
                let tracker = self.lifecycle.tracker_mut(operation)?;
                tracker.set_source(source)?;
                Ok(flushed(tracker, None))
            }
            Command::SetSegment(segment) => {
                let tracker = self.lifecycle.tracker_mut(operation)?;
                tracker.set_segment(segment)?;
                Ok(flushed(tracker, None))
            }
            Command::AddProduct(product) => {
                self.lifecycle.tracker_mut(operation)?.add_product(product)?;
                Ok(CommandOutcome::default())
            }
            Command::SetCommerceAction(action) => {
                let tracker = self.lifecycle.tracker_mut(operation)?;
                let id = tracker.set_commerce_action(&action)?;
                Ok(flushed(tracker, Some(id)))
            }
            Command::ViewProduct(product) => self.commerce(operation, product, "detail"),
            Command::Purchase(product) => self.commerce(operation, product, "purchase"),
            Command::Flush => {
                let tracker = self.lifecycle.tracker(operation)?;
                Ok(flushed(tracker, None))
            }
        }
    }

    fn initialize(&mut self, config: TrackerConfig) -> Result<CommandOutcome> {
        self.log.push("Starting tracker initialization...");
        self.log.push(format!(
            "Creating tracker with namespace: {}",
            config.namespace
        ));
        self.log.push(format!(
            "Account ID: {}, Source ID: {}",
            config.account_id, config.source_id
        ));

        let mut builder = Tracker::builder(config).diagnostics(Arc::clone(&self.diagnostics));
        if let Some(transport) = &self.transport {
            builder = builder.transport(Arc::clone(transport));
        }
        let tracker = self.lifecycle.initialize(builder)?;
        let flush = tracker.flush();
        self.log.push("Initialization complete, tracker ready for events");
        Ok(CommandOutcome {
            tracking_id: None,
            flush: Some(flush).filter(|f| !f.is_noop()),
            lines: Vec::new(),
        })
    }

    fn commerce(
        &mut self,
        operation: &str,
        product: Product,
        action: &str,
    ) -> Result<CommandOutcome> {
        let tracker = self.lifecycle.tracker_mut(operation)?;
        let summary = product_summary(&product);
        tracker.add_product(product)?;
        self.log.push(format!("Added product {summary}"));
        let id = tracker.set_commerce_action(action)?;
        self.log.push(format!("Commerce action '{action}' tracked"));
        Ok(flushed(tracker, Some(id)))
    }
}

fn flushed(tracker: &Tracker, tracking_id: Option<TrackingId>) -> CommandOutcome {
    let flush = tracker.flush();
    CommandOutcome {
        tracking_id,
        flush: Some(flush).filter(|f| !f.is_noop()),
        lines: Vec::new(),
    }
}

fn product_summary(product: &Product) -> String {
    let mut summary = product.id.clone();
    if let Some(name) = &product.name {
        summary.push_str(&format!(" ({name})"));
    }
    if let Some(price) = product.price {
        summary.push_str(&format!(" ${price:.2}"));
    }
    if let Some(quantity) = product.quantity {
        summary.push_str(&format!(" x{quantity}"));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::transport::RecordingTransport;

    fn executor() -> (CommandExecutor, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::new());
        let executor = CommandExecutor::default().with_transport(transport.clone());
        (executor, transport)
    }

    fn config() -> TrackerConfig {
        TrackerConfig::builder("iosTracker")
            .credentials("00000-1", "00000-2")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_commands_before_initialize_fail() {
        let (mut executor, transport) = executor();
        let err = executor
            .execute(Command::TrackScreenView {
                name: "Home".into(),
            })
            .unwrap_err();

        assert!(matches!(
            err,
            Error::NotInitialized { ref operation } if operation == "track_screen_view"
        ));
        assert_eq!(transport.attempts(), 0);
        assert!(executor.log().lines().iter().any(|l| l.contains("Error:")));
    }

    #[tokio::test]
    async fn test_clear_logs_works_uninitialized() {
        let (mut executor, _) = executor();
        let _ = executor.execute(Command::Flush);
        executor.execute(Command::ClearLogs).unwrap();
        assert!(executor.log().is_empty());
    }

    #[tokio::test]
    async fn test_second_initialize_is_duplicate() {
        let (mut executor, _) = executor();
        executor.execute(Command::Initialize(config())).unwrap();
        let err = executor.execute(Command::Initialize(config())).unwrap_err();
        assert!(matches!(err, Error::DuplicateNamespace { .. }));
    }

    #[tokio::test]
    async fn test_screen_view_is_flushed() {
        let (mut executor, transport) = executor();
        executor.execute(Command::Initialize(config())).unwrap();

        let mut outcome = executor
            .execute(Command::TrackScreenView {
                name: "Home".into(),
            })
            .unwrap();
        assert!(outcome.tracking_id.is_some());
        assert!(!outcome.lines.is_empty());
        outcome.wait().await;

        assert_eq!(transport.delivered_events().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_link_rejected() {
        let (mut executor, _) = executor();
        executor.execute(Command::Initialize(config())).unwrap();
        let err = executor
            .execute(Command::TrackLinkClick {
                target_url: "not a url".into(),
            })
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[tokio::test]
    async fn test_context_command_without_events_does_not_flush() {
        let (mut executor, _) = executor();
        executor.execute(Command::Initialize(config())).unwrap();
        let segment = Segment::new("premium-users", "1").unwrap();
        let outcome = executor.execute(Command::SetSegment(segment)).unwrap();
        assert!(outcome.flush.is_none());
    }

    #[tokio::test]
    async fn test_demo_sequence_runs_end_to_end() {
        let (mut executor, transport) = executor();
        for command in Command::demo_sequence(config()).unwrap() {
            let mut outcome = executor.execute(command).unwrap();
            outcome.wait().await;
        }

        // screen view, link click, detail, purchase, debug
        assert_eq!(transport.delivered_events().len(), 5);
        let tracker = executor.lifecycle().tracker("status").unwrap();
        assert_eq!(tracker.pending(), 0);
        assert!(tracker.context().products().is_empty());
        assert_eq!(tracker.context().source().unwrap().account_id, "updated-account-123");
    }
}
