//! End-to-end delivery against a mock collector

use serde_json::Value;
use std::time::Duration;
use surfside_config::TrackerConfig;
use surfside_core::{
    Event, Location, Product, DEFAULT_POST_PATH, PAYLOAD_DATA_SCHEMA, PRODUCT_CONTEXT_SCHEMA,
};
use surfside_tracker::Tracker;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> TrackerConfig {
    TrackerConfig::builder("iosTracker")
        .endpoint(server.uri())
        .credentials("00000-1", "00000-2")
        .retry_delays(Duration::from_millis(5), Duration::from_millis(20))
        .request_timeout(Duration::from_secs(2))
        .build()
        .unwrap()
}

async fn collector(status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(DEFAULT_POST_PATH))
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;
    server
}

/// Every event POSTed to the server, in arrival order
async fn received_events(server: &MockServer) -> Vec<Value> {
    let requests = server.received_requests().await.unwrap_or_default();
    requests
        .iter()
        .map(|r| serde_json::from_slice::<Value>(&r.body).unwrap())
        .flat_map(|body| {
            assert_eq!(body["schema"], PAYLOAD_DATA_SCHEMA);
            body["data"].as_array().cloned().unwrap_or_default()
        })
        .collect()
}

fn decode(event: &Value, field: &str) -> Value {
    serde_json::from_str(event[field].as_str().unwrap()).unwrap()
}

fn contexts(event: &Value) -> Vec<Value> {
    decode(event, "co")["data"].as_array().cloned().unwrap()
}

#[tokio::test]
async fn test_single_screen_view_delivered() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(DEFAULT_POST_PATH))
        .and(header("content-type", "application/json; charset=utf-8"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let tracker = Tracker::builder(config(&server)).build().unwrap();
    tracker.track(Event::screen_view("Home").unwrap()).unwrap();
    let report = tracker.flush_and_wait().await;

    assert_eq!(report.events_delivered, 1);
    let events = received_events(&server).await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["tna"], "iosTracker");

    let ue = decode(&events[0], "ue_pr");
    let schema = ue["data"]["schema"].as_str().unwrap();
    assert!(schema.contains("/screen_view/"));
    assert_eq!(ue["data"]["data"], serde_json::json!({"name": "Home"}));
}

#[tokio::test]
async fn test_flush_on_empty_queue_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let tracker = Tracker::builder(config(&server)).build().unwrap();
    let handle = tracker.flush();
    assert!(handle.is_noop());
    assert_eq!(handle.wait().await.batches_sent, 0);
}

#[tokio::test]
async fn test_latest_location_attached() {
    let server = collector(200).await;
    let mut tracker = Tracker::builder(config(&server)).build().unwrap();

    tracker
        .set_location(Location::new("40.7128", "-74.0060", "US", "NY", "New York").unwrap())
        .unwrap();
    tracker
        .set_location(Location::new("37.7749", "-122.4194", "US", "CA", "San Francisco").unwrap())
        .unwrap();
    tracker.track_screen_view("Home").unwrap();
    tracker.flush_and_wait().await;

    let events = received_events(&server).await;
    let latitudes: Vec<_> = contexts(&events[0])
        .iter()
        .filter_map(|c| c["data"].get("latitude").cloned())
        .collect();
    assert_eq!(latitudes, vec![Value::from("37.7749")]);
}

#[tokio::test]
async fn test_purchase_carries_accumulated_products() {
    let server = collector(200).await;
    let mut tracker = Tracker::builder(config(&server)).build().unwrap();

    for id in ["P1", "P2", "P3"] {
        tracker
            .add_product(Product::builder(id).price(9.99).quantity(1).build().unwrap())
            .unwrap();
    }
    tracker.set_commerce_action("purchase").unwrap();
    assert!(tracker.context().products().is_empty());

    tracker
        .add_product(Product::builder("P4").build().unwrap())
        .unwrap();
    tracker.set_commerce_action("add_to_cart").unwrap();
    tracker.flush_and_wait().await;

    let events = received_events(&server).await;
    assert_eq!(events.len(), 2);

    let product_ids = |event: &Value| -> Vec<String> {
        contexts(event)
            .iter()
            .filter(|c| c["schema"] == PRODUCT_CONTEXT_SCHEMA)
            .map(|c| c["data"]["id"].as_str().unwrap().to_string())
            .collect()
    };
    assert_eq!(product_ids(&events[0]), vec!["P1", "P2", "P3"]);
    assert_eq!(product_ids(&events[1]), vec!["P4"]);

    let ue = decode(&events[0], "ue_pr");
    assert_eq!(ue["data"]["data"]["action"], "purchase");
    assert_eq!(ue["data"]["data"]["products"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_server_error_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let tracker = Tracker::builder(config(&server)).build().unwrap();
    tracker.track_screen_view("Home").unwrap();
    let report = tracker.flush_and_wait().await;

    assert_eq!(report.retries, 2);
    assert_eq!(report.events_delivered, 1);
    assert_eq!(tracker.pending(), 0);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_client_error_drops_batch_without_retry() {
    let server = collector(400).await;
    let tracker = Tracker::builder(config(&server)).build().unwrap();
    tracker.track_screen_view("Home").unwrap();

    let report = tracker.flush_and_wait().await;
    assert_eq!(report.events_dropped, 1);
    assert_eq!(report.retries, 0);
    assert_eq!(tracker.pending(), 0);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_batches_follow_batch_size() {
    let server = collector(200).await;
    let mut config = config(&server);
    config.emitter.batch_size = 2;
    let tracker = Tracker::builder(config).build().unwrap();

    for name in ["a", "b", "c", "d", "e"] {
        tracker.track_screen_view(name).unwrap();
    }
    let report = tracker.flush_and_wait().await;

    assert_eq!(report.batches_sent, 3);
    let names: Vec<_> = received_events(&server)
        .await
        .iter()
        .map(|e| decode(e, "ue_pr")["data"]["data"]["name"].clone())
        .collect();
    assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
}

#[tokio::test]
async fn test_unreachable_collector_does_not_fail_initialization() {
    let config = TrackerConfig::builder("iosTracker")
        .endpoint("http://127.0.0.1:9")
        .max_retries(0)
        .build()
        .unwrap();
    let tracker = Tracker::builder(config).build().unwrap();
    tracker.track_screen_view("Home").unwrap();

    let report = tracker.flush_and_wait().await;
    assert_eq!(report.events_dropped, 1);
}
