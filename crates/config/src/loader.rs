//! Configuration loader for the tracker
//!
//! Layers, lowest precedence first: defaults, an optional JSON file, then
//! `SURFSIDE_*` environment variables.

use crate::config::TrackerConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;
use surfside_core::{
    Error, Result, SURFSIDE_ACCOUNT_ID_VAR, SURFSIDE_BATCH_SIZE_VAR, SURFSIDE_ENDPOINT_VAR,
    SURFSIDE_ENVIRONMENT_VAR, SURFSIDE_MAX_RETRIES_VAR, SURFSIDE_NAMESPACE_VAR,
    SURFSIDE_REQUEST_TIMEOUT_MS_VAR, SURFSIDE_SOURCE_ID_VAR,
};
use tracing::debug;

/// Loads a [`TrackerConfig`] from a file and/or the process environment
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    use_env: bool,
}

impl ConfigLoader {
    /// Create a loader that reads nothing beyond the defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a JSON config file first
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Apply `SURFSIDE_*` environment variables on top
    pub fn with_env(mut self, use_env: bool) -> Self {
        self.use_env = use_env;
        self
    }

    /// Load and validate the configuration
    pub fn load(self) -> Result<TrackerConfig> {
        let mut config = match &self.file {
            Some(path) => TrackerConfig::from_file(path)?,
            None => TrackerConfig::default(),
        };
        if self.use_env {
            config.apply_overrides(|key| std::env::var(key).ok())?;
        }
        config.validate()?;
        Ok(config)
    }
}

impl TrackerConfig {
    /// Defaults overridden by `SURFSIDE_*` environment variables
    pub fn from_env() -> Result<Self> {
        ConfigLoader::new().with_env(true).load()
    }

    /// Read a JSON config file; missing fields take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::file_system(path, "read", e))?;
        let config: TrackerConfig = serde_json::from_str(&contents).map_err(|e| {
            Error::configuration(format!("invalid config file '{}': {e}", path.display()))
        })?;
        debug!(path = %path.display(), namespace = %config.namespace, "Loaded tracker config file");
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in practice)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(namespace) = lookup(SURFSIDE_NAMESPACE_VAR) {
            self.namespace = namespace;
        }
        if let Some(environment) = lookup(SURFSIDE_ENVIRONMENT_VAR) {
            self.environment = environment.parse()?;
        }
        if let Some(endpoint) = lookup(SURFSIDE_ENDPOINT_VAR) {
            self.endpoint = Some(endpoint);
        }
        if let Some(account_id) = lookup(SURFSIDE_ACCOUNT_ID_VAR) {
            self.account_id = account_id;
        }
        if let Some(source_id) = lookup(SURFSIDE_SOURCE_ID_VAR) {
            self.source_id = source_id;
        }
        if let Some(batch_size) = lookup(SURFSIDE_BATCH_SIZE_VAR) {
            self.emitter.batch_size = parse_number(SURFSIDE_BATCH_SIZE_VAR, &batch_size)?;
        }
        if let Some(max_retries) = lookup(SURFSIDE_MAX_RETRIES_VAR) {
            self.emitter.max_retries = parse_number(SURFSIDE_MAX_RETRIES_VAR, &max_retries)?;
        }
        if let Some(timeout) = lookup(SURFSIDE_REQUEST_TIMEOUT_MS_VAR) {
            let millis: u64 = parse_number(SURFSIDE_REQUEST_TIMEOUT_MS_VAR, &timeout)?;
            self.emitter.request_timeout = Duration::from_millis(millis);
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(var: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        Error::configuration(format!("{var} must be a non-negative integer, got '{value}'"))
    })
}
