//! Ordered key/value payloads and the self-describing JSON envelope

use crate::errors::{Result, Validate};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered mapping of field name to JSON value
///
/// Insertion order is kept all the way to the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(IndexMap<String, Value>);

impl Payload {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a field, replacing any previous value for the key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Check that keys are non-empty and every value is a scalar
    pub fn validate_flat(&self) -> Result<()> {
        for (key, value) in &self.0 {
            Validate::not_empty(key, "payload key")?;
            Validate::with_predicate(
                value,
                |v| !matches!(v, Value::Array(_) | Value::Object(_)),
                &format!("payload field '{key}'"),
                "must be a string, number, boolean or null",
            )?;
        }
        Ok(())
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone().into_iter().collect())
    }
}

impl<K, V> FromIterator<(K, V)> for Payload
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// `{"schema": ..., "data": ...}` as used for events, contexts and envelopes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfDescribingJson {
    pub schema: String,
    pub data: Value,
}

impl SelfDescribingJson {
    pub fn new(schema: impl Into<String>, data: impl Into<Value>) -> Self {
        Self {
            schema: schema.into(),
            data: data.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_keeps_insertion_order() {
        let payload = Payload::new()
            .with("zeta", 1)
            .with("alpha", "a")
            .with("mid", true);
        let keys: Vec<_> = payload.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(
            serde_json::to_string(&payload).unwrap(),
            r#"{"zeta":1,"alpha":"a","mid":true}"#
        );
    }

    #[test]
    fn test_validate_flat_rejects_nested_values() {
        let ok = Payload::new().with("targetUrl", "https://example.com");
        assert!(ok.validate_flat().is_ok());

        let nested = Payload::new().with("items", json!([1, 2]));
        assert!(nested.validate_flat().is_err());

        let empty_key = Payload::new().with("", 1);
        assert!(empty_key.validate_flat().is_err());
    }
}
