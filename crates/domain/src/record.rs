use std::fmt::{Display, Formatter};

use chrono::{FixedOffset, NaiveDateTime, TimeZone};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

const DISPLAY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Field names written by the display form itself; same-named server fields
/// are dropped on output.
const DISPLAY_FIELDS: [&str; 4] = ["key", "display_timestamp", "id", "created_at"];

/// Identifier carried by a server record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Numeric database identifier.
    Number(i64),
    /// Opaque string identifier.
    Text(String),
}

impl Display for RecordId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(value) => write!(formatter, "{value}"),
            Self::Text(value) => formatter.write_str(value),
        }
    }
}

/// Server-supplied list entry.
///
/// Only the fields the view layer derives from are typed; everything else
/// travels in `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListRecord {
    /// Record identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// Creation time in epoch seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    /// Remaining server fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ListRecord {
    /// Returns an extension field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }
}

/// List entry enriched with the fields the rendering layer keys on.
///
/// Serializes as one flat object: the derived fields, then the server record.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRecord {
    key: String,
    display_timestamp: String,
    record: ListRecord,
}

impl DisplayRecord {
    /// Derives the display form of a record at `position` within its page.
    ///
    /// Records without an identifier are keyed by position so keys stay
    /// unique within one page.
    #[must_use]
    pub fn derive(record: ListRecord, position: usize, offset: FixedOffset) -> Self {
        let key = record
            .id
            .as_ref()
            .map(RecordId::to_string)
            .unwrap_or_else(|| format!("row-{position}"));
        let display_timestamp = record
            .created_at
            .and_then(|created_at| format_timestamp(created_at, offset))
            .unwrap_or_default();

        Self {
            key,
            display_timestamp,
            record,
        }
    }

    /// Returns the stable row key.
    #[must_use]
    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    /// Returns the human readable creation time.
    #[must_use]
    pub fn display_timestamp(&self) -> &str {
        self.display_timestamp.as_str()
    }

    /// Returns the underlying server record.
    #[must_use]
    pub fn record(&self) -> &ListRecord {
        &self.record
    }
}

impl Serialize for DisplayRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("key", &self.key)?;
        map.serialize_entry("display_timestamp", &self.display_timestamp)?;
        if let Some(id) = &self.record.id {
            map.serialize_entry("id", id)?;
        }
        if let Some(created_at) = self.record.created_at {
            map.serialize_entry("created_at", &created_at)?;
        }
        for (name, value) in &self.record.extra {
            if !DISPLAY_FIELDS.contains(&name.as_str()) {
                map.serialize_entry(name, value)?;
            }
        }
        map.end()
    }
}

/// Formats epoch seconds as `YYYY-MM-DD HH:MM:SS` in the given offset.
#[must_use]
pub fn format_timestamp(epoch_seconds: i64, offset: FixedOffset) -> Option<String> {
    offset
        .timestamp_opt(epoch_seconds, 0)
        .single()
        .map(|value| value.format(DISPLAY_TIMESTAMP_FORMAT).to_string())
}

/// Parses a `YYYY-MM-DD HH:MM:SS` string in the given offset into epoch seconds.
#[must_use]
pub fn parse_timestamp(value: &str, offset: FixedOffset) -> Option<i64> {
    let naive = NaiveDateTime::parse_from_str(value.trim(), DISPLAY_TIMESTAMP_FORMAT).ok()?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|value| value.timestamp())
}
