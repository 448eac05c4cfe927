//! Conversions from library errors

use super::types::Error;

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Json {
            message: error.to_string(),
            source: error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_keeps_source() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::from(parse);
        assert!(matches!(err, Error::Json { .. }));
        assert!(std::error::Error::source(&err).is_some());
        assert!(!err.is_retryable());
    }
}
