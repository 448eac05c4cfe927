//! Builder methods for creating errors with context

use super::types::Error;
use std::path::PathBuf;

// Helper methods for creating errors with context
impl Error {
    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create a duplicate namespace error
    #[must_use]
    pub fn duplicate_namespace(namespace: impl Into<String>) -> Self {
        Error::DuplicateNamespace {
            namespace: namespace.into(),
        }
    }

    /// Create a "tracker not ready" error for the named operation
    #[must_use]
    pub fn not_initialized(operation: impl Into<String>) -> Self {
        Error::NotInitialized {
            operation: operation.into(),
        }
    }

    /// Create a validation error
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a delivery error from a collector status code
    #[must_use]
    pub fn delivery(endpoint: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Error::Delivery {
            endpoint: endpoint.into(),
            status,
            message: message.into(),
        }
    }

    /// Create a network error
    #[must_use]
    pub fn network(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Network {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error
    #[must_use]
    pub fn timeout(operation: impl Into<String>, duration: std::time::Duration) -> Self {
        Error::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a file system error with context
    #[must_use]
    pub fn file_system(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Error::FileSystem {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }
}
