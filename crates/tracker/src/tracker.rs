//! The tracker: namespace, contexts and emitter in one place

use crate::context::ContextRegistry;
use crate::emitter::transport::{HttpTransport, Transport};
use crate::emitter::wire::WireSettings;
use crate::emitter::{Emitter, FlushHandle, FlushReport};
use std::sync::Arc;
use surfside_config::TrackerConfig;
use surfside_core::{
    CommerceAction, DiagnosticsBus, Event, Location, Namespace, Payload, Product, Result,
    Segment, Source, TrackedEvent, TrackerDiagnostic, TrackingId, SOURCE_EVENT_SCHEMA,
};
use surfside_utils::RetryConfig;
use tracing::{debug, info, instrument, warn};

/// Builds a [`Tracker`] from a validated configuration
pub struct TrackerBuilder {
    config: TrackerConfig,
    transport: Option<Arc<dyn Transport>>,
    diagnostics: Option<Arc<DiagnosticsBus>>,
    retry: Option<RetryConfig>,
}

impl TrackerBuilder {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            transport: None,
            diagnostics: None,
            retry: None,
        }
    }

    /// Configuration the tracker will be built from
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Deliver through this transport instead of HTTP
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Publish diagnostics on a shared bus
    pub fn diagnostics(mut self, diagnostics: Arc<DiagnosticsBus>) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    /// Override the retry policy derived from the emitter config
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Validate the configuration and create the tracker
    ///
    /// Must be called inside a tokio runtime. The collector is not contacted
    /// here; delivery problems surface when flushing.
    pub fn build(self) -> Result<Tracker> {
        self.config.validate()?;
        let namespace = self.config.namespace()?;
        let url = self.config.collector_url()?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(self.config.emitter.request_timeout)?),
        };
        let diagnostics = self.diagnostics.unwrap_or_default();

        let mut emitter = Emitter::new(
            namespace.as_str(),
            url,
            self.config.emitter.clone(),
            WireSettings {
                app_id: self.config.app_id.clone(),
                platform: self.config.platform.clone(),
            },
            transport,
            Arc::clone(&diagnostics),
        )?;
        if let Some(retry) = self.retry {
            emitter = emitter.with_retry(retry);
        }

        let context = ContextRegistry::with_source(self.config.source());
        let tracker = Tracker {
            namespace,
            config: Arc::new(self.config),
            context,
            emitter,
            diagnostics,
        };

        info!(
            namespace = %tracker.namespace,
            endpoint = tracker.config.endpoint(),
            "Tracker initialized"
        );
        tracker.publish(TrackerDiagnostic::Initialized {
            endpoint: tracker.config.endpoint().to_string(),
        });

        if tracker.config.emit_source_event {
            if let Some(source) = tracker.context.source().cloned() {
                let payload = Payload::new()
                    .with("accountId", source.account_id)
                    .with("sourceId", source.source_id);
                tracker.track(Event::self_describing(SOURCE_EVENT_SCHEMA, payload)?)?;
            }
        }

        Ok(tracker)
    }
}

/// Accepts events, attaches contexts and routes them to the emitter
///
/// Context setters take `&mut self`: one owner writes, while the emitter's
/// queue is shared with the background flush worker.
#[derive(Debug)]
pub struct Tracker {
    namespace: Namespace,
    config: Arc<TrackerConfig>,
    context: ContextRegistry,
    emitter: Emitter,
    diagnostics: Arc<DiagnosticsBus>,
}

impl Tracker {
    pub fn builder(config: TrackerConfig) -> TrackerBuilder {
        TrackerBuilder::new(config)
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn context(&self) -> &ContextRegistry {
        &self.context
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    pub fn diagnostics(&self) -> &Arc<DiagnosticsBus> {
        &self.diagnostics
    }

    fn publish(&self, diagnostic: TrackerDiagnostic) {
        self.diagnostics.publish(self.namespace.as_str(), diagnostic);
    }

    /// Queue an event with a snapshot of the current contexts
    #[instrument(skip(self, event), fields(namespace = %self.namespace, schema = %event.schema()))]
    pub fn track(&self, event: Event) -> Result<TrackingId> {
        let id = event.id();
        let schema = event.schema().tag().to_string();
        let tracked = TrackedEvent {
            namespace: self.namespace.clone(),
            event,
            context: self.context.snapshot(),
        };
        let queued = self.emitter.enqueue(tracked);
        debug!(event_id = %id, queued, "Event queued");
        self.publish(TrackerDiagnostic::EventTracked {
            event_id: id.to_string(),
            schema,
            queued,
        });
        Ok(id)
    }

    /// Build and track a screen view
    pub fn track_screen_view(&self, name: impl Into<String>) -> Result<TrackingId> {
        let event = self.checked(Event::screen_view(name))?;
        self.track(event)
    }

    /// Build and track a self-describing event; invalid input is never queued
    pub fn track_self_describing(&self, schema: &str, payload: Payload) -> Result<TrackingId> {
        let event = self.checked(Event::self_describing(schema, payload))?;
        self.track(event)
    }

    fn checked<T>(&self, result: Result<T>) -> Result<T> {
        result.inspect_err(|e| {
            warn!(namespace = %self.namespace, error = %e, "Event rejected");
            self.publish(TrackerDiagnostic::EventRejected {
                reason: e.to_string(),
            });
        })
    }

    pub fn set_location(&mut self, location: Location) -> Result<()> {
        location.validate()?;
        let summary = format!(
            "{} ({}, {})",
            location.city, location.latitude, location.longitude
        );
        self.context.set_location(location);
        self.context_updated("location", summary);
        Ok(())
    }

    pub fn set_source(&mut self, source: Source) -> Result<()> {
        source.validate()?;
        let summary = format!(
            "accountId={}, sourceId={}",
            source.account_id, source.source_id
        );
        self.context.set_source(source);
        self.context_updated("source", summary);
        Ok(())
    }

    pub fn set_segment(&mut self, segment: Segment) -> Result<()> {
        segment.validate()?;
        let summary = format!("{}={}", segment.segment_id, segment.segment_value);
        self.context.set_segment(segment);
        self.context_updated("segment", summary);
        Ok(())
    }

    /// Append a product to the cart consumed by the next commerce action
    pub fn add_product(&mut self, product: Product) -> Result<()> {
        self.checked(product.validate())?;
        let summary = format!(
            "{} ({} in cart)",
            product.id,
            self.context.products().len() + 1
        );
        self.context.add_product(product);
        self.context_updated("product", summary);
        Ok(())
    }

    /// Track a commerce action carrying every accumulated product, then clear them
    ///
    /// An unknown action is rejected and leaves the products in place.
    pub fn set_commerce_action(&mut self, action: &str) -> Result<TrackingId> {
        let action: CommerceAction = self.checked(action.parse())?;
        let products = self.context.take_products();
        let event = Event::commerce_action(action, products)?;
        self.track(event)
    }

    fn context_updated(&self, context: &str, summary: String) {
        debug!(namespace = %self.namespace, context, %summary, "Context updated");
        self.publish(TrackerDiagnostic::ContextUpdated {
            context: context.to_string(),
            summary,
        });
    }

    pub fn pending(&self) -> usize {
        self.emitter.pending()
    }

    /// Queued events in tracking order
    pub fn pending_events(&self) -> Vec<TrackedEvent> {
        self.emitter.pending_events()
    }

    /// Trigger delivery in the background; a no-op when nothing is queued
    pub fn flush(&self) -> FlushHandle {
        self.emitter.flush()
    }

    /// Flush and wait for the outcome
    pub async fn flush_and_wait(&self) -> FlushReport {
        self.flush().wait().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::transport::RecordingTransport;
    use serde_json::Value;
    use surfside_core::{Error, SCREEN_VIEW_SCHEMA};

    fn config() -> TrackerConfig {
        TrackerConfig::builder("iosTracker")
            .credentials("00000-1", "00000-2")
            .build()
            .unwrap()
    }

    fn tracker_with(config: TrackerConfig) -> (Tracker, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::new());
        let tracker = Tracker::builder(config)
            .transport(transport.clone())
            .build()
            .unwrap();
        (tracker, transport)
    }

    #[tokio::test]
    async fn test_source_context_seeded_from_credentials() {
        let (tracker, _) = tracker_with(config());
        let source = tracker.context().source().unwrap();
        assert_eq!(source.account_id, "00000-1");
        assert_eq!(source.source_id, "00000-2");
        assert_eq!(tracker.pending(), 0);
    }

    #[tokio::test]
    async fn test_source_event_when_enabled() {
        let mut config = config();
        config.emit_source_event = true;
        let (tracker, _) = tracker_with(config);

        let pending = tracker.pending_events();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].event.payload().get("accountId"), Some(&Value::from("00000-1")));
    }

    #[tokio::test]
    async fn test_screen_view_delivered() {
        let (tracker, transport) = tracker_with(config());
        tracker.track_screen_view("Home").unwrap();
        let report = tracker.flush_and_wait().await;

        assert_eq!(report.events_delivered, 1);
        let events = transport.delivered_events();
        let ue: Value = serde_json::from_str(events[0]["ue_pr"].as_str().unwrap()).unwrap();
        assert_eq!(ue["data"]["schema"], SCREEN_VIEW_SCHEMA);
        assert_eq!(ue["data"]["data"]["name"], "Home");
    }

    #[tokio::test]
    async fn test_invalid_event_is_rejected_and_not_queued() {
        let (tracker, _) = tracker_with(config());
        let mut diagnostics = tracker.diagnostics().subscribe();

        let err = tracker.track_screen_view("  ").unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert_eq!(tracker.pending(), 0);

        let record = diagnostics.recv().await.unwrap();
        assert!(matches!(record.diagnostic, TrackerDiagnostic::EventRejected { .. }));
    }

    #[tokio::test]
    async fn test_commerce_action_consumes_products() {
        let (mut tracker, _) = tracker_with(config());
        tracker.add_product(Product::builder("P1").build().unwrap()).unwrap();
        tracker.add_product(Product::builder("P2").build().unwrap()).unwrap();

        tracker.set_commerce_action("purchase").unwrap();
        assert!(tracker.context().products().is_empty());
        assert_eq!(tracker.pending_events()[0].event.products().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_commerce_action_keeps_products() {
        let (mut tracker, _) = tracker_with(config());
        tracker.add_product(Product::builder("P1").build().unwrap()).unwrap();

        assert!(tracker.set_commerce_action("teleport").is_err());
        assert_eq!(tracker.context().products().len(), 1);
        assert_eq!(tracker.pending(), 0);
    }

    #[tokio::test]
    async fn test_context_captured_at_track_time() {
        let (mut tracker, _) = tracker_with(config());
        tracker.set_segment(Segment::new("premium-users", "1").unwrap()).unwrap();
        tracker.track_screen_view("A").unwrap();
        tracker.set_segment(Segment::new("free-users", "0").unwrap()).unwrap();
        tracker.track_screen_view("B").unwrap();

        let pending = tracker.pending_events();
        assert_eq!(pending[0].context.segment.as_ref().unwrap().segment_id, "premium-users");
        assert_eq!(pending[1].context.segment.as_ref().unwrap().segment_id, "free-users");
    }

    #[tokio::test]
    async fn test_empty_source_and_segment_ids_rejected() {
        let (mut tracker, _) = tracker_with(config());
        let source = Source {
            account_id: String::new(),
            source_id: "updated-source-456".into(),
        };
        assert!(matches!(tracker.set_source(source), Err(Error::Validation { .. })));
        assert_eq!(tracker.context().source().unwrap().account_id, "00000-1");

        let segment = Segment {
            segment_id: "  ".into(),
            segment_value: "1".into(),
        };
        assert!(matches!(tracker.set_segment(segment), Err(Error::Validation { .. })));
        assert!(tracker.context().segment().is_none());
    }

    #[test]
    fn test_build_outside_runtime_fails() {
        let err = Tracker::builder(config())
            .transport(Arc::new(RecordingTransport::new()))
            .build()
            .unwrap_err();
        assert!(err.is_configuration_error());
    }
}
