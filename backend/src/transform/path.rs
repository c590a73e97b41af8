//! Typed column paths.
//!
//! A spreadsheet header such as `people.0.name` names a nested destination.
//! Headers are parsed once into a [`ColumnName`] and the decoder branches on
//! the parsed shape instead of on a live regex match.

use once_cell::sync::Lazy;
use regex::Regex;

/// `column.index` or `column.index.field`, no empty segments.
static PATH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^.]+)\.([^.]+)(?:\.([^.]+))?$").expect("column path pattern is valid")
});

/// Destination encoded in a dotted header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPath {
    /// Top-level field in the decoded record.
    pub column: String,
    /// Second segment, as written in the header.
    pub index: String,
    /// Optional third segment.
    pub field: Option<String>,
    /// Whether `index` is all digits, making `column` a sequence.
    pub is_numeric_index: bool,
}

/// Shape of a header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnName {
    /// No dot: the value is stored as-is.
    Plain(String),
    /// Two or three segments.
    Path(ColumnPath),
    /// Contains a dot but is not a two or three segment path; its value is discarded.
    Malformed(String),
}

impl ColumnName {
    pub fn parse(name: &str) -> Self {
        if !name.contains('.') {
            return ColumnName::Plain(name.to_string());
        }

        let Some(caps) = PATH_RE.captures(name) else {
            return ColumnName::Malformed(name.to_string());
        };

        let index = caps[2].to_string();
        ColumnName::Path(ColumnPath {
            column: caps[1].to_string(),
            is_numeric_index: is_numeric(&index),
            index,
            field: caps.get(3).map(|m| m.as_str().to_string()),
        })
    }
}

/// `^\d+$`
pub fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
