//! KonOpas data files.
//!
//! The schedule app loads its data as plain script files:
//!
//! ```text
//! var program = [{"id":"2","title":"...","loc":["Salon 8"]}, ...];
//! ```
//!
//! This module writes those files from decoded records, reads them back for
//! the pocket schedule, and stamps the AppCache manifest so browsers pick up
//! new data.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DataFileError, DataFileResult};
use crate::models::ProgrammingItem;

static VAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*var\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*=\s*").expect("var pattern is valid")
});

/// First comment line of the manifest, with the line break before it.
static APPCACHE_STAMP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\n\r]+#.*").expect("appcache pattern is valid"));

/// Render `var {name} = {json};`. Nulls are written as empty strings.
pub fn to_js_var<T: Serialize>(name: &str, data: &T) -> DataFileResult<String> {
    let mut value = serde_json::to_value(data)?;
    blank_nulls(&mut value);
    Ok(format!("var {} = {};", name, serde_json::to_string(&value)?))
}

fn blank_nulls(value: &mut Value) {
    match value {
        Value::Null => *value = Value::String(String::new()),
        Value::Array(items) => items.iter_mut().for_each(blank_nulls),
        Value::Object(map) => map.values_mut().for_each(blank_nulls),
        _ => {}
    }
}

/// Parse a data file back into JSON, returning the variable name and value.
pub fn parse_js_var(content: &str) -> DataFileResult<(String, Value)> {
    let caps = VAR_RE
        .captures(content)
        .ok_or_else(|| DataFileError::MissingVariable("name".to_string()))?;
    let name = caps[1].to_string();
    let body = content[caps[0].len()..].trim_end().trim_end_matches(';');
    Ok((name, serde_json::from_str(body)?))
}

/// Write `{dir}/{name}.js`, returning the path written.
pub fn write_data_file<T: Serialize>(dir: &Path, name: &str, data: &T) -> DataFileResult<PathBuf> {
    let path = dir.join(format!("{}.js", name));
    fs::write(&path, to_js_var(name, data)?)?;
    Ok(path)
}

/// Read the programming items of a `program.js` file.
pub fn read_program(path: &Path) -> DataFileResult<Vec<ProgrammingItem>> {
    let content = fs::read_to_string(path)?;
    let (_, value) = parse_js_var(&content)?;
    Ok(serde_json::from_value(value)?)
}

/// Replace the first comment line of a manifest with a timestamp.
pub fn stamp_appcache_content(content: &str, now: DateTime<Utc>) -> String {
    let stamp = format!("\n# {}", now.format("%Y-%m-%d %H:%M:%S"));
    APPCACHE_STAMP_RE
        .replacen(content, 1, regex::NoExpand(&stamp))
        .into_owned()
}

/// Stamp the AppCache manifest at `path` in place.
pub fn stamp_appcache(path: &Path) -> DataFileResult<()> {
    let content = fs::read_to_string(path)?;
    fs::write(path, stamp_appcache_content(&content, Utc::now()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_to_js_var_blanks_nulls() {
        let data = json!([{ "id": "1", "desc": null, "people": [{ "id": null, "name": "Ann" }] }]);
        let js = to_js_var("program", &data).unwrap();
        assert_eq!(
            js,
            r#"var program = [{"id":"1","desc":"","people":[{"id":"","name":"Ann"}]}];"#
        );
    }

    #[test]
    fn test_parse_js_var() {
        let (name, value) = parse_js_var("var people = [{\"id\":\"1\"}];\n").unwrap();
        assert_eq!(name, "people");
        assert_eq!(value, json!([{ "id": "1" }]));
    }

    #[test]
    fn test_parse_js_var_rejects_plain_json() {
        let err = parse_js_var("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, DataFileError::MissingVariable(_)));
    }

    #[test]
    fn test_write_then_read_program() {
        let dir = tempfile::tempdir().unwrap();
        let records = json!([{
            "id": "2",
            "title": "Klingon science",
            "date": "2017-11-24",
            "time": "14:00",
            "mins": "60",
            "loc": ["Boardroom"],
            "people": [{ "id": "1", "name": "Alan Anderson" }]
        }]);

        let path = write_data_file(dir.path(), "program", &records).unwrap();
        assert!(path.ends_with("program.js"));

        let items = read_program(&path).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Klingon science");
        assert_eq!(items[0].location(), Some("Boardroom"));
    }

    #[test]
    fn test_stamp_appcache_content() {
        let manifest = "CACHE MANIFEST\n# 2023-11-01 10:00:00\nindex.html\n";
        let now = Utc.with_ymd_and_hms(2024, 1, 5, 18, 30, 0).unwrap();
        assert_eq!(
            stamp_appcache_content(manifest, now),
            "CACHE MANIFEST\n# 2024-01-05 18:30:00\nindex.html\n"
        );
    }

    #[test]
    fn test_stamp_appcache_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("konopas.appcache");
        fs::write(&path, "CACHE MANIFEST\r\n# old\r\ndata/program.js\r\n").unwrap();

        stamp_appcache(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("CACHE MANIFEST\n# 20"));
        assert!(content.contains("data/program.js"));
        assert!(!content.contains("# old"));
    }
}
