//! Context entities attached to every tracked event

use crate::constants::{LOCATION_CONTEXT_SCHEMA, SEGMENT_CONTEXT_SCHEMA, SOURCE_CONTEXT_SCHEMA};
use crate::errors::{Error, Result, Validate};
use crate::types::payload::SelfDescribingJson;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Where the user is. Coordinates are kept as the caller supplied them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: String,
    pub longitude: String,
    pub country_code: String,
    pub state: String,
    pub city: String,
}

impl Location {
    /// Build a location, checking that the coordinates parse and are in range
    pub fn new(
        latitude: impl Into<String>,
        longitude: impl Into<String>,
        country_code: impl Into<String>,
        state: impl Into<String>,
        city: impl Into<String>,
    ) -> Result<Self> {
        let location = Self {
            latitude: latitude.into(),
            longitude: longitude.into(),
            country_code: country_code.into(),
            state: state.into(),
            city: city.into(),
        };
        location.validate()?;
        Ok(location)
    }

    pub fn validate(&self) -> Result<()> {
        let lat = parse_coordinate(&self.latitude, "latitude")?;
        Validate::in_range(lat, -90.0, 90.0, "latitude")?;
        let lon = parse_coordinate(&self.longitude, "longitude")?;
        Validate::in_range(lon, -180.0, 180.0, "longitude")?;
        Ok(())
    }

    pub fn to_entity(&self) -> SelfDescribingJson {
        SelfDescribingJson::new(
            LOCATION_CONTEXT_SCHEMA,
            json!({
                "latitude": self.latitude,
                "longitude": self.longitude,
                "country_code": self.country_code,
                "state": self.state,
                "city": self.city,
            }),
        )
    }
}

fn parse_coordinate(value: &str, field: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::validation(field, format!("'{value}' is not a number")))
}

/// Account and source the traffic is attributed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub account_id: String,
    pub source_id: String,
}

impl Source {
    pub fn new(account_id: impl Into<String>, source_id: impl Into<String>) -> Result<Self> {
        let source = Self {
            account_id: account_id.into(),
            source_id: source_id.into(),
        };
        source.validate()?;
        Ok(source)
    }

    /// Both ids must be non-empty; fields are public so literals skip `new`
    pub fn validate(&self) -> Result<()> {
        Validate::not_empty(&self.account_id, "account_id")?;
        Validate::not_empty(&self.source_id, "source_id")
    }

    pub fn to_entity(&self) -> SelfDescribingJson {
        SelfDescribingJson::new(
            SOURCE_CONTEXT_SCHEMA,
            json!({
                "accountId": self.account_id,
                "sourceId": self.source_id,
            }),
        )
    }
}

/// Audience segment membership
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub segment_id: String,
    pub segment_value: String,
}

impl Segment {
    pub fn new(segment_id: impl Into<String>, segment_value: impl Into<String>) -> Result<Self> {
        let segment = Self {
            segment_id: segment_id.into(),
            segment_value: segment_value.into(),
        };
        segment.validate()?;
        Ok(segment)
    }

    pub fn validate(&self) -> Result<()> {
        Validate::not_empty(&self.segment_id, "segment_id")
    }

    pub fn to_entity(&self) -> SelfDescribingJson {
        SelfDescribingJson::new(
            SEGMENT_CONTEXT_SCHEMA,
            json!({
                "segmentId": self.segment_id,
                "segmentVal": self.segment_value,
            }),
        )
    }
}

/// Point-in-time copy of the single-valued contexts, captured at `track` time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSnapshot {
    pub location: Option<Location>,
    pub source: Option<Source>,
    pub segment: Option<Segment>,
}

impl ContextSnapshot {
    pub fn is_empty(&self) -> bool {
        self.location.is_none() && self.source.is_none() && self.segment.is_none()
    }

    /// Entities in a stable order: source, location, segment
    pub fn entities(&self) -> Vec<SelfDescribingJson> {
        let mut entities = Vec::with_capacity(3);
        if let Some(source) = &self.source {
            entities.push(source.to_entity());
        }
        if let Some(location) = &self.location {
            entities.push(location.to_entity());
        }
        if let Some(segment) = &self.segment {
            entities.push(segment.to_entity());
        }
        entities
    }
}
