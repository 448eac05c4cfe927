//! Tracker and emitter configuration
//!
//! The configuration is immutable once a tracker has been initialized: the
//! tracker takes ownership and shares it behind an `Arc`.

use crate::serde_helpers::duration_ms;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use surfside_core::{
    Error, Namespace, Result, Source, DEFAULT_APP_ID, DEFAULT_NAMESPACE, DEFAULT_PLATFORM,
    DEFAULT_POST_PATH, DEVELOPMENT_ENDPOINT, PRODUCTION_ENDPOINT,
};
use surfside_utils::RetryConfig;
use url::Url;

/// Collector environment; selects the default endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn endpoint(&self) -> &'static str {
        match self {
            Environment::Development => DEVELOPMENT_ENDPOINT,
            Environment::Production => PRODUCTION_ENDPOINT,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(Error::configuration(format!(
                "unknown environment '{other}', expected 'development' or 'production'"
            ))),
        }
    }
}

/// Delivery settings for the emitter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Events per POST; 0 sends everything pending in one request
    pub batch_size: usize,
    /// Retries per batch after the first failed attempt
    pub max_retries: u32,
    /// Timeout for a single POST
    #[serde(with = "duration_ms", rename = "request_timeout_ms")]
    pub request_timeout: Duration,
    #[serde(with = "duration_ms", rename = "retry_base_delay_ms")]
    pub retry_base_delay: Duration,
    #[serde(with = "duration_ms", rename = "retry_max_delay_ms")]
    pub retry_max_delay: Duration,
    /// Path appended to the endpoint for POST requests
    pub post_path: String,
    /// Upper bound on pending events; the oldest are dropped beyond it
    pub queue_capacity: usize,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            batch_size: 0,
            max_retries: 3,
            request_timeout: Duration::from_secs(10),
            retry_base_delay: Duration::from_millis(200),
            retry_max_delay: Duration::from_secs(5),
            post_path: DEFAULT_POST_PATH.to_string(),
            queue_capacity: 10_000,
        }
    }
}

impl EmitterConfig {
    /// Retry policy derived from these settings
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.max_retries,
            base_delay: self.retry_base_delay,
            max_delay: self.retry_max_delay,
            ..RetryConfig::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.request_timeout.is_zero() {
            return Err(Error::configuration("request timeout must be greater than zero"));
        }
        if self.queue_capacity == 0 {
            return Err(Error::configuration("queue capacity must be greater than zero"));
        }
        if !self.post_path.is_empty() && !self.post_path.starts_with('/') {
            return Err(Error::configuration(format!(
                "post path '{}' must start with '/'",
                self.post_path
            )));
        }
        Ok(())
    }
}

/// Everything needed to initialize a tracker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Unique per process
    pub namespace: String,
    pub environment: Environment,
    /// Explicit collector URL; overrides the environment default
    pub endpoint: Option<String>,
    pub account_id: String,
    pub source_id: String,
    pub app_id: String,
    pub platform: String,
    /// Track a `source` event as part of initialization
    pub emit_source_event: bool,
    pub emitter: EmitterConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            environment: Environment::default(),
            endpoint: None,
            account_id: String::new(),
            source_id: String::new(),
            app_id: DEFAULT_APP_ID.to_string(),
            platform: DEFAULT_PLATFORM.to_string(),
            emit_source_event: false,
            emitter: EmitterConfig::default(),
        }
    }
}

impl TrackerConfig {
    /// Start building a configuration for the given namespace
    pub fn builder(namespace: impl Into<String>) -> TrackerConfigBuilder {
        TrackerConfigBuilder::new(namespace)
    }

    /// Collector base URL as configured
    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.environment.endpoint())
    }

    /// Validated namespace
    pub fn namespace(&self) -> Result<Namespace> {
        Namespace::new(&self.namespace)
            .map_err(|e| Error::configuration(format!("invalid tracker namespace: {e}")))
    }

    /// Source context seeded from the credentials, if both ids are set
    pub fn source(&self) -> Option<Source> {
        Source::new(&self.account_id, &self.source_id).ok()
    }

    /// Full URL batches are POSTed to
    pub fn collector_url(&self) -> Result<Url> {
        let endpoint = self.endpoint();
        let base = Url::parse(endpoint).map_err(|e| {
            Error::configuration(format!("malformed endpoint '{endpoint}': {e}"))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::configuration(format!(
                "endpoint '{endpoint}' must use http or https"
            )));
        }
        if base.host_str().is_none() {
            return Err(Error::configuration(format!(
                "endpoint '{endpoint}' has no host"
            )));
        }

        let path = format!(
            "{}{}",
            base.path().trim_end_matches('/'),
            self.emitter.post_path
        );
        let mut url = base;
        url.set_path(&path);
        Ok(url)
    }

    /// Check everything a tracker relies on at initialization
    pub fn validate(&self) -> Result<()> {
        self.namespace()?;
        self.emitter.validate()?;
        self.collector_url()?;
        Ok(())
    }
}

/// Fluent builder for [`TrackerConfig`]
#[derive(Debug, Clone)]
pub struct TrackerConfigBuilder {
    config: TrackerConfig,
}

impl TrackerConfigBuilder {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            config: TrackerConfig {
                namespace: namespace.into(),
                ..TrackerConfig::default()
            },
        }
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.config.environment = environment;
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = Some(endpoint.into());
        self
    }

    pub fn credentials(
        mut self,
        account_id: impl Into<String>,
        source_id: impl Into<String>,
    ) -> Self {
        self.config.account_id = account_id.into();
        self.config.source_id = source_id.into();
        self
    }

    pub fn app_id(mut self, app_id: impl Into<String>) -> Self {
        self.config.app_id = app_id.into();
        self
    }

    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.config.platform = platform.into();
        self
    }

    pub fn emit_source_event(mut self, emit: bool) -> Self {
        self.config.emit_source_event = emit;
        self
    }

    pub fn emitter(mut self, emitter: EmitterConfig) -> Self {
        self.config.emitter = emitter;
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.emitter.batch_size = batch_size;
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.emitter.max_retries = max_retries;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.emitter.request_timeout = timeout;
        self
    }

    pub fn retry_delays(mut self, base: Duration, max: Duration) -> Self {
        self.config.emitter.retry_base_delay = base;
        self.config.emitter.retry_max_delay = max;
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> Result<TrackerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
