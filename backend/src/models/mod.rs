//! Domain models for the KonOpas data tools.
//!
//! - [`RawRow`] - One spreadsheet row, column name to trimmed value
//! - [`DecodedRecord`] - A row after column-path decoding
//! - [`ProgrammingItem`] - A program entry as consumed by the schedule grid
//! - [`Person`] - A participant reference inside a programming item

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Raw Row
// =============================================================================

/// A single spreadsheet row, in the column order the sheet declared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    fields: Vec<(String, String)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from `(column, value)` pairs, keeping their order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Append a column. A repeated column name replaces the earlier value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// =============================================================================
// Decoded Record
// =============================================================================

/// A decoded row: scalar strings, arrays and nested objects keyed by the
/// top-level column name. Key order follows first appearance in the row.
pub type DecodedRecord = Map<String, Value>;

// =============================================================================
// Programming Item
// =============================================================================

/// A participant attached to a programming item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Person {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
}

/// A KonOpas program entry.
///
/// ```text
/// { id: '94', title: 'Kerbal Space Program', date: '2021-11-28',
///   time: '12:00', mins: '120', loc: ['Salon 8'], tags: ['Gaming'],
///   people: [{ name: 'Full Name', id: '3' }] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgrammingItem {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    /// Duration in minutes as it came from the sheet; may be missing or junk.
    #[serde(default, deserialize_with = "lenient_string")]
    pub mins: Option<String>,
    #[serde(default)]
    pub loc: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// Any other columns the sheet carried.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProgrammingItem {
    /// First location, used for grid placement.
    pub fn location(&self) -> Option<&str> {
        self.loc.first().map(String::as_str).filter(|l| !l.is_empty())
    }

    pub fn is_cancelled(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.to_lowercase().contains("cancelled"))
    }

    pub fn has_id(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// Convert a decoded record into a programming item.
    pub fn from_record(record: &DecodedRecord) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(record.clone()))
    }
}

/// Accept strings, numbers or null for fields that spreadsheets sometimes
/// hand over as numbers.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
