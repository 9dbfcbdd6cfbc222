//! Forecast document models
//!
//! Field names follow the CWA payload so a document reads, stores and serializes
//! with the same shape it had upstream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::region::Region;

/// One forecast snapshot for a region, as delivered by the provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastDocument {
    #[serde(rename = "DatasetDescription", default)]
    pub description: String,
    #[serde(rename = "LocationsName", default)]
    pub region_label: String,
    #[serde(rename = "Dataid", default)]
    pub dataset_id: String,
    /// Required; an explicit empty list is accepted
    #[serde(rename = "Location")]
    pub locations: Vec<LocationRecord>,
}

impl ForecastDocument {
    /// Copy of this document keeping only locations whose name contains `filter`.
    ///
    /// Matching is a case-sensitive substring test and keeps the original order.
    /// Returns `None` when nothing matches.
    pub fn with_locations_matching(&self, filter: &str) -> Option<ForecastDocument> {
        let locations: Vec<LocationRecord> = self
            .locations
            .iter()
            .filter(|location| location.name.contains(filter))
            .cloned()
            .collect();

        if locations.is_empty() {
            return None;
        }

        Some(ForecastDocument {
            description: self.description.clone(),
            region_label: self.region_label.clone(),
            dataset_id: self.dataset_id.clone(),
            locations,
        })
    }

    pub fn location_names(&self) -> Vec<&str> {
        self.locations.iter().map(|l| l.name.as_str()).collect()
    }
}

/// A stored snapshot: the document plus the identity and timestamp assigned on write
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastRecord {
    pub id: Uuid,
    pub region: Region,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub document: ForecastDocument,
}

/// A district-level place within a forecast document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationRecord {
    #[serde(rename = "LocationName", default)]
    pub name: String,
    #[serde(rename = "Geocode", default, deserialize_with = "opaque_string")]
    pub geocode: String,
    #[serde(rename = "Latitude", default, deserialize_with = "opaque_string")]
    pub latitude: String,
    #[serde(rename = "Longitude", default, deserialize_with = "opaque_string")]
    pub longitude: String,
    #[serde(rename = "WeatherElement", default)]
    pub elements: Vec<WeatherElement>,
}

impl LocationRecord {
    pub fn element(&self, name: &str) -> Option<&WeatherElement> {
        self.elements.iter().find(|e| e.element_name == name)
    }
}

/// One measured quantity over time (e.g. 溫度)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherElement {
    #[serde(rename = "ElementName", default)]
    pub element_name: String,
    #[serde(rename = "Time", default)]
    pub time_series: Vec<TimeWindow>,
}

/// A `[start, end)` window with its provider-defined values
///
/// Point-in-time elements carry `DataTime` instead of a start/end pair. Fields the
/// provider adds later are kept in `extra` and written back unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeWindow {
    #[serde(rename = "StartTime", default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(rename = "EndTime", default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(rename = "DataTime", default, skip_serializing_if = "Option::is_none")]
    pub data_time: Option<String>,
    #[serde(rename = "ElementValue", default)]
    pub values: Vec<ElementValue>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Loosely-typed value bag, e.g. `{"Temperature": "25"}` or
/// `{"WindSpeed": "2", "BeaufortScale": "2"}`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ElementValue {
    pub fields: BTreeMap<String, FieldValue>,
}

impl ElementValue {
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Field rendered as text when it holds a scalar
    pub fn text(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Number(n) => Some(n.to_string()),
            FieldValue::Flag(b) => Some(b.to_string()),
            FieldValue::Missing | FieldValue::Raw(_) => None,
        }
    }

    /// Field parsed as a number; provider numbers usually arrive as strings
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.fields.get(key)? {
            FieldValue::Number(n) => n.as_f64(),
            FieldValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Known scalar kinds plus an escape hatch for anything else
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
    Missing,
    Raw(Value),
}

/// Accept strings or bare numbers for positional metadata and keep them as text
fn opaque_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, found {}",
            other
        ))),
    }
}
