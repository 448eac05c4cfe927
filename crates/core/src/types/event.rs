//! Immutable event model
//!
//! Events are built through validating constructors and never mutated
//! afterwards; the tracker wraps them in a [`TrackedEvent`] together with the
//! context snapshot taken when they were tracked.

use crate::constants::{COMMERCE_ACTION_SCHEMA, SCREEN_VIEW_SCHEMA};
use crate::errors::{Result, Validate};
use crate::types::commerce::{CommerceAction, Product};
use crate::types::context::ContextSnapshot;
use crate::types::newtypes::{Namespace, SchemaUri, TrackingId};
use crate::types::payload::{Payload, SelfDescribingJson};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which constructor produced the event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    ScreenView,
    SelfDescribing,
    CommerceAction,
}

/// Something that happened, described by a schema and a payload
///
/// Serialize only: every `Event` comes from a validating constructor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    id: TrackingId,
    event_type: EventType,
    schema: SchemaUri,
    payload: Payload,
    products: Vec<Product>,
    created_at: DateTime<Utc>,
}

impl Event {
    /// A screen view with the built-in schema and a `{name}` payload
    pub fn screen_view(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        Validate::not_empty(&name, "screen name")?;
        Ok(Self::build(
            EventType::ScreenView,
            SchemaUri::new(SCREEN_VIEW_SCHEMA)?,
            Payload::new().with("name", name),
            Vec::new(),
        ))
    }

    /// A custom event; the schema must be non-empty and the payload flat
    pub fn self_describing(schema: impl AsRef<str>, payload: Payload) -> Result<Self> {
        let schema = SchemaUri::new(schema.as_ref())?;
        payload.validate_flat()?;
        Ok(Self::build(
            EventType::SelfDescribing,
            schema,
            payload,
            Vec::new(),
        ))
    }

    /// A commerce action carrying the products it consumed
    pub fn commerce_action(action: CommerceAction, products: Vec<Product>) -> Result<Self> {
        for product in &products {
            product.validate()?;
        }
        let payload = Payload::new().with("action", action.as_str()).with(
            "products",
            Value::Array(products.iter().map(Product::to_value).collect()),
        );
        Ok(Self::build(
            EventType::CommerceAction,
            SchemaUri::new(COMMERCE_ACTION_SCHEMA)?,
            payload,
            products,
        ))
    }

    fn build(
        event_type: EventType,
        schema: SchemaUri,
        payload: Payload,
        products: Vec<Product>,
    ) -> Self {
        Self {
            id: TrackingId::new(),
            event_type,
            schema,
            payload,
            products,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> TrackingId {
        self.id
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    pub fn schema(&self) -> &SchemaUri {
        &self.schema
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Products consumed by a commerce action; empty for other events
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The `{schema, data}` body of the event
    pub fn to_self_describing(&self) -> SelfDescribingJson {
        SelfDescribingJson::new(self.schema.as_str(), self.payload.to_value())
    }
}

/// An event accepted by a tracker, with the contexts in force at `track` time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedEvent {
    pub namespace: Namespace,
    pub event: Event,
    pub context: ContextSnapshot,
}

impl TrackedEvent {
    pub fn id(&self) -> TrackingId {
        self.event.id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::LINK_CLICK_SCHEMA;
    use serde_json::json;

    #[test]
    fn test_screen_view_shape() {
        let event = Event::screen_view("Home").unwrap();
        assert_eq!(event.event_type(), EventType::ScreenView);
        assert_eq!(event.schema().tag(), "screen_view");
        assert_eq!(event.payload().to_value(), json!({"name": "Home"}));
        assert!(Event::screen_view("").is_err());
    }

    #[test]
    fn test_self_describing_validation() {
        let payload = Payload::new().with("targetUrl", "https://example.com");
        let event = Event::self_describing(LINK_CLICK_SCHEMA, payload.clone()).unwrap();
        assert_eq!(event.schema().tag(), "link_click");

        assert!(Event::self_describing("", payload).is_err());
        assert!(
            Event::self_describing(LINK_CLICK_SCHEMA, Payload::new().with("x", json!({}))).is_err()
        );
    }

    #[test]
    fn test_commerce_action_payload() {
        let products = vec![
            Product::builder("a").price(1.0).build().unwrap(),
            Product::builder("b").build().unwrap(),
        ];
        let event = Event::commerce_action(CommerceAction::Purchase, products).unwrap();
        assert_eq!(event.products().len(), 2);
        assert_eq!(event.payload().get("action").unwrap(), "purchase");
        assert_eq!(
            event.payload().get("products").unwrap(),
            &json!([{"id": "a", "price": 1.0}, {"id": "b"}])
        );
    }

    #[test]
    fn test_tracked_event_serializes() {
        let tracked = TrackedEvent {
            namespace: Namespace::new("iosTracker").unwrap(),
            event: Event::screen_view("Home").unwrap(),
            context: ContextSnapshot::default(),
        };
        let value = serde_json::to_value(&tracked).unwrap();
        assert_eq!(value["namespace"], "iosTracker");
        assert_eq!(value["event"]["event_type"], "screen_view");
        assert_eq!(value["event"]["payload"], json!({"name": "Home"}));
    }

    #[test]
    fn test_events_get_distinct_ids() {
        let a = Event::screen_view("Home").unwrap();
        let b = Event::screen_view("Home").unwrap();
        assert_ne!(a.id(), b.id());
    }
}
