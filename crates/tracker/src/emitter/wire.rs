//! Snowplow tracker-protocol serialisation of event batches

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use surfside_core::{
    Result, SelfDescribingJson, TrackedEvent, CONTEXTS_SCHEMA, PAYLOAD_DATA_SCHEMA,
    UNSTRUCT_EVENT_SCHEMA,
};

/// Tracker-wide fields stamped on every event
#[derive(Debug, Clone)]
pub struct WireSettings {
    pub app_id: String,
    pub platform: String,
}

/// Protocol map for one event
pub fn encode_event(
    tracked: &TrackedEvent,
    settings: &WireSettings,
    sent_at: DateTime<Utc>,
) -> Value {
    let event = &tracked.event;
    let mut map = Map::new();
    map.insert("e".into(), Value::from("ue"));
    map.insert("eid".into(), Value::from(event.id().to_string()));
    map.insert(
        "dtm".into(),
        Value::from(event.created_at().timestamp_millis().to_string()),
    );
    map.insert("stm".into(), Value::from(sent_at.timestamp_millis().to_string()));
    map.insert("tna".into(), Value::from(tracked.namespace.as_str()));
    map.insert("aid".into(), Value::from(settings.app_id.clone()));
    map.insert("p".into(), Value::from(settings.platform.clone()));

    let unstruct =
        SelfDescribingJson::new(UNSTRUCT_EVENT_SCHEMA, json!(event.to_self_describing()));
    map.insert("ue_pr".into(), Value::from(json!(unstruct).to_string()));

    let mut entities = tracked.context.entities();
    entities.extend(event.products().iter().map(|p| p.to_entity()));
    if !entities.is_empty() {
        let contexts = SelfDescribingJson::new(CONTEXTS_SCHEMA, json!(entities));
        map.insert("co".into(), Value::from(json!(contexts).to_string()));
    }

    Value::Object(map)
}

/// POST body for a batch of events
pub fn encode_batch(events: &[TrackedEvent], settings: &WireSettings) -> Result<String> {
    let sent_at = Utc::now();
    let data: Vec<Value> = events
        .iter()
        .map(|event| encode_event(event, settings, sent_at))
        .collect();
    let envelope = SelfDescribingJson::new(PAYLOAD_DATA_SCHEMA, Value::Array(data));
    Ok(serde_json::to_string(&envelope)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use surfside_core::{
        CommerceAction, ContextSnapshot, Event, Location, Namespace, Product, Source,
        LOCATION_CONTEXT_SCHEMA, PRODUCT_CONTEXT_SCHEMA, SCREEN_VIEW_SCHEMA,
    };

    fn settings() -> WireSettings {
        WireSettings {
            app_id: "surfside-demo".into(),
            platform: "mob".into(),
        }
    }

    fn tracked(event: Event, context: ContextSnapshot) -> TrackedEvent {
        TrackedEvent {
            namespace: Namespace::new("iosTracker").unwrap(),
            event,
            context,
        }
    }

    #[test]
    fn test_screen_view_encoding() {
        let event = Event::screen_view("Home").unwrap();
        let id = event.id().to_string();
        let screen_view = tracked(event, ContextSnapshot::default());
        let encoded = encode_event(&screen_view, &settings(), Utc::now());

        assert_eq!(encoded["e"], "ue");
        assert_eq!(encoded["eid"], id.as_str());
        assert_eq!(encoded["tna"], "iosTracker");
        assert!(encoded.get("co").is_none());

        let ue: Value = serde_json::from_str(encoded["ue_pr"].as_str().unwrap()).unwrap();
        assert_eq!(ue["schema"], UNSTRUCT_EVENT_SCHEMA);
        assert_eq!(ue["data"]["schema"], SCREEN_VIEW_SCHEMA);
        assert_eq!(ue["data"]["data"], json!({"name": "Home"}));
    }

    #[test]
    fn test_contexts_and_products_attached() {
        let context = ContextSnapshot {
            location: Some(
                Location::new("37.7749", "-122.4194", "US", "CA", "San Francisco").unwrap(),
            ),
            source: Some(Source::new("00000-1", "00000-2").unwrap()),
            segment: None,
        };
        let product = Product::builder("P12345").quantity(2).build().unwrap();
        let event = Event::commerce_action(CommerceAction::Detail, vec![product]).unwrap();
        let encoded = encode_event(&tracked(event, context), &settings(), Utc::now());

        let co: Value = serde_json::from_str(encoded["co"].as_str().unwrap()).unwrap();
        assert_eq!(co["schema"], CONTEXTS_SCHEMA);
        let schemas: Vec<_> = co["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["schema"].as_str().unwrap())
            .collect();
        assert_eq!(schemas.len(), 3);
        assert_eq!(schemas[1], LOCATION_CONTEXT_SCHEMA);
        assert_eq!(schemas[2], PRODUCT_CONTEXT_SCHEMA);
    }

    #[test]
    fn test_batch_envelope() {
        let events = vec![
            tracked(Event::screen_view("A").unwrap(), ContextSnapshot::default()),
            tracked(Event::screen_view("B").unwrap(), ContextSnapshot::default()),
        ];
        let body = encode_batch(&events, &settings()).unwrap();
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["schema"], PAYLOAD_DATA_SCHEMA);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
        assert_eq!(body["data"][0]["stm"], body["data"][1]["stm"]);
    }
}
