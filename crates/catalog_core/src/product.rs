use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Name of the store's partition key attribute.
pub const PRODUCT_ID_ATTRIBUTE: &str = "productId";

/// Per-category attribute bag. Keys are kept sorted so serialized records are stable.
pub type Specifications = BTreeMap<String, SpecValue>;

/// A single specification value: either free text or an ordered list of text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SpecValue {
    Text(String),
    List(Vec<String>),
}

impl From<&str> for SpecValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<&[&str]> for SpecValue {
    fn from(values: &[&str]) -> Self {
        Self::List(values.iter().map(|value| value.to_string()).collect())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: String,
    pub product_name: String,
    pub category: String,
    pub brand: String,
    #[serde(default)]
    pub specifications: Specifications,
    pub created_at: String,
    pub updated_at: String,
}

/// Formats an instant the way records and envelopes carry it
/// (`2025-10-29T12:23:12.000Z`).
pub fn iso_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}
