//! Wire types of the Archiv Kompakt REST API.
//!
//! Identifiers are normalized to strings whether the service sends them as
//! JSON strings or numbers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{ArchivError, ArchivResult};

/// Default number of hits requested per search.
pub const DEFAULT_CHUNK_SIZE: u32 = 500;

/// A top-level archive and its searchable indexes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Archive {
    #[serde(rename = "ID", deserialize_with = "id_string")]
    pub id: String,

    #[serde(rename = "Name", default)]
    pub name: Option<String>,

    #[serde(rename = "Indexes", default)]
    pub indexes: Vec<ArchiveIndex>,

    /// Fields this client does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A named, searchable field of an archive.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArchiveIndex {
    #[serde(rename = "ID", deserialize_with = "id_string")]
    pub id: String,

    #[serde(rename = "Name")]
    pub name: String,
}

/// One `{ID, Value}` search condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexFilter {
    #[serde(rename = "ID")]
    pub id: String,

    #[serde(rename = "Value")]
    pub value: String,
}

impl IndexFilter {
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }

    /// A filter list holding a single condition.
    pub fn single(id: impl Into<String>, value: impl Into<String>) -> Vec<Self> {
        vec![Self::new(id, value)]
    }
}

/// Body of `POST /v2/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchPayload {
    #[serde(rename = "maxHits")]
    pub max_hits: u32,

    pub indexes: Vec<IndexFilter>,

    #[serde(rename = "arcIDs", skip_serializing_if = "Option::is_none")]
    pub arc_ids: Option<Vec<String>>,
}

impl SearchPayload {
    /// Build a payload. Missing filters become an empty list.
    pub fn new(
        indexes: Option<Vec<IndexFilter>>,
        max_hits: u32,
        archive_ids: Option<ArchiveIds>,
    ) -> Self {
        Self {
            max_hits,
            indexes: indexes.unwrap_or_default(),
            arc_ids: archive_ids.map(ArchiveIds::into_vec),
        }
    }
}

/// Archive restriction for a search: one id or several.
///
/// Always sent as a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveIds {
    One(String),
    Many(Vec<String>),
}

impl ArchiveIds {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(id) => vec![id],
            Self::Many(ids) => ids,
        }
    }
}

impl From<&str> for ArchiveIds {
    fn from(id: &str) -> Self {
        Self::One(id.to_string())
    }
}

impl From<String> for ArchiveIds {
    fn from(id: String) -> Self {
        Self::One(id)
    }
}

impl From<Vec<String>> for ArchiveIds {
    fn from(ids: Vec<String>) -> Self {
        Self::Many(ids)
    }
}

impl From<&[&str]> for ArchiveIds {
    fn from(ids: &[&str]) -> Self {
        Self::Many(ids.iter().map(|id| id.to_string()).collect())
    }
}

/// A document record as returned by search and document lookup.
///
/// The service returns loosely shaped objects; only `ID` is interpreted here.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// The document's `ID`, if present and a string or number.
    pub fn id(&self) -> Option<String> {
        self.0.get("ID").and_then(value_as_id)
    }

    /// Raw access to any field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// A string field.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }
}

/// Parse a `/Date(1600000000000+0200)/` timestamp.
///
/// The zone suffix is informational; the milliseconds are UTC.
pub fn parse_creation_date(raw: &str) -> ArchivResult<DateTime<Utc>> {
    let invalid = || ArchivError::InvalidDate(raw.to_string());

    let inner = raw
        .split_once('(')
        .and_then(|(_, rest)| rest.split_once(')'))
        .map(|(inner, _)| inner.trim())
        .ok_or_else(invalid)?;

    // Skip a leading sign so negative epochs keep their minus.
    let zone_at = inner
        .char_indices()
        .skip(1)
        .find(|(_, c)| *c == '+' || *c == '-')
        .map(|(i, _)| i)
        .unwrap_or(inner.len());

    let millis: i64 = inner[..zone_at].parse().map_err(|_| invalid())?;
    DateTime::from_timestamp_millis(millis).ok_or_else(invalid)
}

fn value_as_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_as_id(&value).ok_or_else(|| {
        serde::de::Error::custom(format!("expected string or number ID, got {value}"))
    })
}
