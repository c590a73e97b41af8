//! Column-path decoder
//!
//! Turns flat spreadsheet rows into nested KonOpas records. Headers such as
//! `loc.0` or `people.3.name` describe where a cell lands in the output:
//!
//! ```text
//! id | title   | loc.0  | people.3.name | people.3.id | people.7.name
//! 12 | Opening | Salon 8| Alan          | 1           | Ann
//!
//! { "id": "12", "title": "Opening", "loc": ["Salon 8"],
//!   "people": [{ "name": "Alan", "id": "1" }, { "name": "Ann" }] }
//! ```
//!
//! Index numbers in headers only group cells; the output arrays are always
//! packed from 0 in the order the sheet first uses each index, so sheet
//! authors may leave gaps.

use serde_json::{Map, Value};
use std::collections::HashMap;

use super::path::{ColumnName, ColumnPath};
use crate::diagnostics::Diagnostics;
use crate::models::{DecodedRecord, RawRow};

/// Field every published record must carry.
pub const ID_FIELD: &str = "id";

/// Result of decoding a batch of rows
#[derive(Debug, Default)]
pub struct DecodeResult {
    /// Records that carry an `id`
    pub records: Vec<DecodedRecord>,
    /// Rows dropped after decoding
    pub skipped: Vec<SkippedRow>,
    /// Anomalies found while decoding
    pub diagnostics: Diagnostics,
}

/// A row that was dropped
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    pub row: usize,
    pub reason: String,
}

impl DecodeResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get summary statistics
    pub fn summary(&self) -> String {
        format!(
            "Decoded: {} records, {} skipped, {} warnings",
            self.records.len(),
            self.skipped.len(),
            self.diagnostics.warning_count()
        )
    }
}

/// Sequence slots handed out within one row, per column and header index.
#[derive(Debug, Default)]
struct IndexSlots {
    slots: HashMap<String, HashMap<String, usize>>,
}

impl IndexSlots {
    /// Slot for `column.index`, assigning `next` the first time the pair is seen.
    fn resolve(&mut self, column: &str, index: &str, next: usize) -> usize {
        *self
            .slots
            .entry(column.to_string())
            .or_default()
            .entry(index.to_string())
            .or_insert(next)
    }
}

/// Decode every row and keep the ones that carry an `id`.
pub fn decode(rows: &[RawRow]) -> Vec<DecodedRecord> {
    decode_rows(rows).records
}

/// Decode every row, reporting dropped rows and anomalies.
pub fn decode_rows(rows: &[RawRow]) -> DecodeResult {
    let mut result = DecodeResult::new();

    for (i, row) in rows.iter().enumerate() {
        let record = decode_row(row, &mut result.diagnostics);

        if record.contains_key(ID_FIELD) {
            result.records.push(record);
        } else {
            result.skipped.push(SkippedRow {
                row: i,
                reason: format!("missing '{}'", ID_FIELD),
            });
        }
    }

    result
}

/// Decode a single row. Does not apply the `id` filter.
pub fn decode_row(row: &RawRow, diagnostics: &mut Diagnostics) -> DecodedRecord {
    let mut record = Map::new();
    let mut slots = IndexSlots::default();

    for (name, value) in row.iter() {
        let value = value.trim();

        match ColumnName::parse(name) {
            ColumnName::Plain(name) => {
                if !value.is_empty() {
                    record.insert(name, Value::String(value.to_string()));
                }
            }
            ColumnName::Path(path) => {
                if !value.is_empty() {
                    place(&mut record, &path, value, &mut slots, diagnostics);
                }
            }
            // Known quirk: a dotted header that is not `a.b` or `a.b.c` loses its value.
            ColumnName::Malformed(name) => {
                tracing::debug!(column = %name, "discarding malformed column path");
            }
        }
    }

    record
}

fn place(
    record: &mut DecodedRecord,
    path: &ColumnPath,
    value: &str,
    slots: &mut IndexSlots,
    diagnostics: &mut Diagnostics,
) {
    let container = record.entry(path.column.clone()).or_insert_with(|| {
        if path.is_numeric_index {
            Value::Array(Vec::new())
        } else {
            Value::Object(Map::new())
        }
    });

    match (container, &path.field) {
        (Value::Array(items), Some(field)) => {
            let slot = slots.resolve(&path.column, &path.index, items.len());
            if slot == items.len() {
                items.push(Value::Object(Map::new()));
            }
            match items.get_mut(slot) {
                Some(Value::Object(entry)) => {
                    entry.insert(field.clone(), Value::String(value.to_string()));
                }
                _ => conflict(path, "slot already holds a plain value", diagnostics),
            }
        }
        (Value::Array(items), None) => {
            if path.is_numeric_index {
                items.push(Value::String(value.to_string()));
            } else {
                conflict(path, "named key on a list column", diagnostics);
            }
        }
        (Value::Object(entries), Some(field)) => {
            let entry = entries
                .entry(path.index.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            match entry {
                Value::Object(entry) => {
                    entry.insert(field.clone(), Value::String(value.to_string()));
                }
                _ => conflict(path, "key already holds a plain value", diagnostics),
            }
        }
        (Value::Object(entries), None) => {
            entries.insert(path.index.clone(), Value::String(value.to_string()));
        }
        _ => conflict(path, "column already holds a plain value", diagnostics),
    }
}

fn conflict(path: &ColumnPath, reason: &str, diagnostics: &mut Diagnostics) {
    let header = match &path.field {
        Some(field) => format!("{}.{}.{}", path.column, path.index, field),
        None => format!("{}.{}", path.column, path.index),
    };
    diagnostics.warning(format!("Column '{}' dropped: {}", header, reason));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        RawRow::from_pairs(pairs.iter().copied())
    }

    fn decode_one(pairs: &[(&str, &str)]) -> Value {
        Value::Object(decode_row(&row(pairs), &mut Diagnostics::new()))
    }

    #[test]
    fn test_plain_columns_pass_through_without_empties() {
        let decoded = decode_one(&[("id", "7"), ("title", "Opening"), ("desc", ""), ("mins", "60")]);
        assert_eq!(decoded, json!({ "id": "7", "title": "Opening", "mins": "60" }));
    }

    #[test]
    fn test_values_are_trimmed() {
        let decoded = decode_one(&[("id", " 7 "), ("title", "   "), ("loc.0", " Salon 8 ")]);
        assert_eq!(decoded, json!({ "id": "7", "loc": ["Salon 8"] }));
    }

    #[test]
    fn test_people_fields_share_a_slot() {
        let decoded = decode_one(&[("id", "1"), ("people.0.name", "Alan"), ("people.0.id", "1")]);
        assert_eq!(decoded["people"], json!([{ "name": "Alan", "id": "1" }]));
    }

    #[test]
    fn test_single_location_is_not_sparse() {
        let decoded = decode_one(&[("id", "1"), ("loc.0", "Room A")]);
        assert_eq!(decoded["loc"], json!(["Room A"]));
    }

    #[test]
    fn test_index_gaps_are_packed() {
        let decoded = decode_one(&[
            ("id", "1"),
            ("column.3.field", "a"),
            ("column.9.field2", "b"),
        ]);
        assert_eq!(decoded["column"], json!([{ "field": "a" }, { "field2": "b" }]));
    }

    #[test]
    fn test_empty_cells_do_not_consume_slots() {
        let decoded = decode_one(&[
            ("id", "1"),
            ("people.0.name", ""),
            ("people.0.id", ""),
            ("people.1.name", "Ann"),
            ("people.1.id", "3"),
        ]);
        assert_eq!(decoded["people"], json!([{ "name": "Ann", "id": "3" }]));
    }

    #[test]
    fn test_repeated_index_after_other_index_reuses_slot() {
        let decoded = decode_one(&[
            ("id", "1"),
            ("people.5.name", "Alan"),
            ("people.2.name", "Ann"),
            ("people.5.id", "1"),
            ("people.2.id", "3"),
        ]);
        assert_eq!(
            decoded["people"],
            json!([{ "name": "Alan", "id": "1" }, { "name": "Ann", "id": "3" }])
        );
    }

    #[test]
    fn test_indexed_values_without_field_append_in_column_order() {
        let decoded = decode_one(&[("id", "1"), ("tags.4", "Gaming"), ("tags.1", ""), ("tags.2", "STEM")]);
        assert_eq!(decoded["tags"], json!(["Gaming", "STEM"]));
    }

    #[test]
    fn test_named_index_builds_object() {
        let decoded = decode_one(&[("id", "1"), ("name.first", "Alan"), ("name.last", "Anderson")]);
        assert_eq!(decoded["name"], json!({ "first": "Alan", "last": "Anderson" }));
    }

    #[test]
    fn test_named_index_with_field_nests_by_key() {
        let decoded = decode_one(&[("id", "1"), ("links.web.url", "https://example.org")]);
        assert_eq!(decoded["links"], json!({ "web": { "url": "https://example.org" } }));
    }

    #[test]
    fn test_malformed_dotted_column_is_dropped() {
        // Documented quirk: the value of a dotted header that is not a
        // two or three segment path disappears without a trace.
        let decoded = decode_one(&[("id", "1"), ("a.b.c.d", "lost"), ("x..y", "lost too")]);
        assert_eq!(decoded, json!({ "id": "1" }));
    }

    #[test]
    fn test_dotted_value_on_plain_column_is_reported() {
        let mut diags = Diagnostics::new();
        let record = decode_row(&row(&[("id", "1"), ("loc", "Lobby"), ("loc.0", "Salon 8")]), &mut diags);
        assert_eq!(record["loc"], json!("Lobby"));
        assert_eq!(diags.warning_count(), 1);
        assert!(diags.entries()[0].message.contains("loc.0"));
    }

    #[test]
    fn test_rows_without_id_are_dropped() {
        let rows = vec![
            row(&[("id", "1"), ("title", "Kept")]),
            row(&[("id", ""), ("title", "Dropped")]),
            row(&[("title", "Also dropped")]),
        ];
        let result = decode_rows(&rows);

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0]["title"], "Kept");
        assert_eq!(result.skipped.iter().map(|s| s.row).collect::<Vec<_>>(), vec![1, 2]);
        assert!(result.summary().contains("1 records, 2 skipped"));
    }

    #[test]
    fn test_slots_are_scoped_per_row() {
        let rows = vec![
            row(&[("id", "1"), ("people.0.name", "Alan"), ("people.1.name", "Ann")]),
            row(&[("id", "2"), ("people.1.name", "Ann"), ("people.0.name", "Alan")]),
        ];
        let records = decode(&rows);

        assert_eq!(records[0]["people"], json!([{ "name": "Alan" }, { "name": "Ann" }]));
        assert_eq!(records[1]["people"], json!([{ "name": "Ann" }, { "name": "Alan" }]));
    }

    #[test]
    fn test_input_rows_are_not_modified() {
        let rows = vec![row(&[("id", "1"), ("loc.0", "Salon 8"), ("desc", "")])];
        let before = rows.clone();
        let _ = decode(&rows);
        assert_eq!(rows, before);
    }

    #[test]
    fn test_key_order_follows_first_appearance() {
        let decoded = decode_one(&[
            ("id", "2"),
            ("title", "Klingon science"),
            ("loc.0", "Boardroom"),
            ("tags.0", "Discussion"),
            ("people.0.id", "1"),
            ("people.0.name", "Alan Anderson"),
        ]);
        let keys: Vec<&String> = decoded.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["id", "title", "loc", "tags", "people"]);
    }
}
