//! Core error type definitions

use std::path::PathBuf;

/// Result type alias for tracker operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for tracker operations using thiserror
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed configuration (bad endpoint, empty namespace, zero timeout)
    Configuration { message: String },

    /// A tracker with this namespace is already initialized
    DuplicateNamespace { namespace: String },

    /// Operation attempted before the tracker was initialized
    NotInitialized { operation: String },

    /// Event or context rejected before it reached the queue
    Validation { field: String, message: String },

    /// Collector answered with a non-2xx status
    Delivery {
        endpoint: String,
        status: u16,
        message: String,
    },

    /// Network-related errors
    Network { endpoint: String, message: String },

    /// A single network attempt exceeded its timeout
    Timeout {
        operation: String,
        duration: std::time::Duration,
    },

    /// JSON serialization/deserialization errors
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// File system operations
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Whether a delivery attempt that failed with this error may be retried
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Network { .. } | Error::Timeout { .. } => true,
            Error::Delivery { status, .. } => {
                *status >= 500 || *status == 408 || *status == 429
            }
            _ => false,
        }
    }

    /// Configuration-class errors, including a rejected duplicate namespace
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Error::Configuration { .. } | Error::DuplicateNamespace { .. }
        )
    }
}
