//! Newtype wrappers for enhanced type safety

use crate::errors::{Error, Result, Validate};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::ops::Deref;
use std::str::FromStr;
use uuid::Uuid;

/// A validated tracker namespace
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Namespace(String);

impl Namespace {
    /// Create a new Namespace with validation
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        Validate::not_empty(&name, "namespace")?;
        Validate::with_predicate(
            name.clone(),
            |n| {
                n.chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
            },
            "namespace",
            "must contain only ASCII letters, digits, underscores, hyphens, and dots",
        )?;
        Ok(Namespace(name))
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Deref for Namespace {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromStr for Namespace {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for Namespace {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::new(s)
    }
}

impl From<Namespace> for String {
    fn from(namespace: Namespace) -> Self {
        namespace.0
    }
}

/// A schema identifier such as `iglu:com.acme/link_click/jsonschema/1-0-1`
///
/// Only non-emptiness is enforced. Anything that looks like an Iglu URI also
/// yields a short [`tag`](SchemaUri::tag).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SchemaUri(String);

impl SchemaUri {
    /// Create a new SchemaUri with validation
    pub fn new(uri: impl Into<String>) -> Result<Self> {
        let uri = uri.into();
        Validate::not_empty(&uri, "schema")?;
        Ok(SchemaUri(uri))
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short event name, e.g. `screen_view` for the mobile screen view schema
    pub fn tag(&self) -> &str {
        let body = self.0.strip_prefix("iglu:").unwrap_or(&self.0);
        let mut parts = body.split('/');
        match (parts.next(), parts.next()) {
            (Some(_vendor), Some(name)) if !name.is_empty() => name,
            _ => body,
        }
    }
}

impl Display for SchemaUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SchemaUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for SchemaUri {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<&str> for SchemaUri {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl From<SchemaUri> for String {
    fn from(schema: SchemaUri) -> Self {
        schema.0
    }
}

/// Identifier handed back by `track`, also sent as the event id (`eid`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackingId(Uuid);

impl TrackingId {
    /// Generate a fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TrackingId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for TrackingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_validation() {
        assert!(Namespace::new("iosTracker").is_ok());
        assert!(Namespace::new("web-tracker.v2").is_ok());
        assert!(Namespace::new("").is_err());
        assert!(Namespace::new("has space").is_err());
    }

    #[test]
    fn test_schema_tag() {
        let schema =
            SchemaUri::new("iglu:com.snowplowanalytics.snowplow/link_click/jsonschema/1-0-1")
                .unwrap();
        assert_eq!(schema.tag(), "link_click");

        let schema = SchemaUri::new("screen_view").unwrap();
        assert_eq!(schema.tag(), "screen_view");
    }

    #[test]
    fn test_empty_schema_rejected() {
        let err = SchemaUri::new("").unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "schema"));
    }

    #[test]
    fn test_tracking_ids_are_unique() {
        assert_ne!(TrackingId::new(), TrackingId::new());
    }
}
