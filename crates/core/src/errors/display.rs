//! Display implementations for error types

use super::types::Error;
use std::fmt;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration { message } => {
                write!(f, "configuration error: {message}")
            }
            Error::DuplicateNamespace { namespace } => {
                write!(f, "tracker namespace '{namespace}' is already initialized")
            }
            Error::NotInitialized { operation } => {
                write!(f, "cannot {operation}: tracker not initialized")
            }
            Error::Validation { field, message } => {
                write!(f, "invalid {field}: {message}")
            }
            Error::Delivery {
                endpoint,
                status,
                message,
            } => {
                if message.is_empty() {
                    write!(f, "collector '{endpoint}' rejected batch with status {status}")
                } else {
                    write!(
                        f,
                        "collector '{endpoint}' rejected batch with status {status}: {message}"
                    )
                }
            }
            Error::Network { endpoint, message } => {
                write!(f, "network error for '{endpoint}': {message}")
            }
            Error::Timeout {
                operation,
                duration,
            } => {
                write!(f, "operation '{operation}' timed out after {duration:?}")
            }
            Error::Json { message, .. } => {
                write!(f, "JSON error: {message}")
            }
            Error::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "file system {} operation failed for '{}': {}",
                    operation,
                    path.display(),
                    source
                )
            }
        }
    }
}
