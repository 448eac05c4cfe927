//! Delivery of encoded batches to the collector

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::collections::VecDeque;
use std::time::Duration;
use surfside_core::{Error, Result, POST_CONTENT_TYPE};
use tracing::debug;
use url::Url;

/// One POST of a batch
#[derive(Debug, Clone)]
pub struct PostRequest {
    pub url: Url,
    pub body: String,
    pub event_count: usize,
}

/// Sends batches; implementations report non-2xx answers as [`Error::Delivery`]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &PostRequest) -> Result<()>;

    /// Transport name for debugging
    fn name(&self) -> &'static str;
}

/// HTTP(S) transport backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    request_timeout: Duration,
}

impl HttpTransport {
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| Error::configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            request_timeout,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &PostRequest) -> Result<()> {
        let endpoint = request.url.as_str();
        let response = self
            .client
            .post(request.url.clone())
            .header(CONTENT_TYPE, POST_CONTENT_TYPE)
            .body(request.body.clone())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::timeout(format!("POST {endpoint}"), self.request_timeout)
                } else {
                    Error::network(endpoint, e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(endpoint, events = request.event_count, %status, "Batch accepted");
            return Ok(());
        }

        let message = response.text().await.unwrap_or_default();
        Err(Error::delivery(endpoint, status.as_u16(), message))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Scripted failure for [`RecordingTransport`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Collector answers with this status
    Status(u16),
    /// Connection-level failure
    Network,
    /// Attempt hangs for the given duration before succeeding
    Delay(Duration),
}

/// In-memory transport that records every accepted batch
///
/// Failures can be scripted per attempt; once the script is exhausted every
/// attempt succeeds.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    delivered: Mutex<Vec<PostRequest>>,
    script: Mutex<VecDeque<Failure>>,
    attempts: Mutex<usize>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue failures for the next attempts, in order
    pub fn script<I: IntoIterator<Item = Failure>>(&self, failures: I) {
        self.script.lock().extend(failures);
    }

    /// Number of send attempts, successful or not
    pub fn attempts(&self) -> usize {
        *self.attempts.lock()
    }

    pub fn delivered(&self) -> Vec<PostRequest> {
        self.delivered.lock().clone()
    }

    /// Every delivered event's protocol map, in delivery order
    pub fn delivered_events(&self) -> Vec<Value> {
        self.delivered
            .lock()
            .iter()
            .filter_map(|request| serde_json::from_str::<Value>(&request.body).ok())
            .filter_map(|body| body.get("data").and_then(Value::as_array).cloned())
            .flatten()
            .collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: &PostRequest) -> Result<()> {
        *self.attempts.lock() += 1;
        let next = self.script.lock().pop_front();
        match next {
            Some(Failure::Status(status)) => {
                return Err(Error::delivery(request.url.as_str(), status, "scripted failure"))
            }
            Some(Failure::Network) => {
                return Err(Error::network(request.url.as_str(), "scripted connection failure"))
            }
            Some(Failure::Delay(delay)) => tokio::time::sleep(delay).await,
            None => {}
        }
        self.delivered.lock().push(request.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
