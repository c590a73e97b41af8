//! High-level pipeline API for publishing sheets as KonOpas data files.
//!
//! `sync_sheets` combines all steps: download, decoding of dotted column
//! names, writing `{path}/{name}.js` and stamping the AppCache manifest.
//!
//! # Example
//!
//! ```rust,ignore
//! use konopas::{sync_sheets, SyncConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SyncConfig::load(Path::new("konopas.json"))?;
//!     let report = sync_sheets(&config).await?;
//!
//!     println!("Published {} sheets", report.sheets.len());
//!     Ok(())
//! }
//! ```

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::decoder::{decode_rows, DecodeResult};
use crate::config::{SheetSource, SyncConfig};
use crate::datafile::{stamp_appcache, write_data_file};
use crate::diagnostics::Diagnostics;
use crate::error::{DataFileResult, PipelineError, PipelineResult};
use crate::fetch::SheetFetcher;
use crate::parser::{parse_csv_file_auto, ParseResult};

/// Outcome for one published sheet
#[derive(Debug, Clone, Serialize)]
pub struct SheetReport {
    pub name: String,
    /// Data file written
    pub path: PathBuf,
    /// Rows read from the sheet
    pub row_count: usize,
    /// Records written
    pub record_count: usize,
    /// Rows dropped for lack of an `id`
    pub skipped_count: usize,
}

/// Result of a sync run
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub sheets: Vec<SheetReport>,
    /// Manifest stamped after writing, if any
    pub appcache: Option<PathBuf>,
    pub diagnostics: Diagnostics,
}

impl SyncReport {
    pub fn record_count(&self) -> usize {
        self.sheets.iter().map(|s| s.record_count).sum()
    }
}

/// Fetch every configured sheet and publish it as a data file.
///
/// Sheets are downloaded concurrently; nothing is written unless every
/// download succeeds.
pub async fn sync_sheets(config: &SyncConfig) -> PipelineResult<SyncReport> {
    let sources: Vec<SheetSource> = config.active_sheets().cloned().collect();
    if sources.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let mut report = SyncReport::default();
    report
        .diagnostics
        .info(format!("Fetching {} sheet(s)...", sources.len()));

    let fetcher = SheetFetcher::new(Duration::from_secs(config.timeout_secs))?;
    let fetched = fetcher.fetch_all(&sources).await?;

    for sheet in &fetched {
        let (sheet_report, diagnostics) = publish_sheet(&sheet.source, &sheet.csv)?;
        report.diagnostics.extend(diagnostics);
        report.sheets.push(sheet_report);
    }

    if let Some(ref manifest) = config.appcache {
        stamp_appcache(manifest)?;
        report
            .diagnostics
            .success(format!("Stamped {}", manifest.display()));
        report.appcache = Some(manifest.clone());
    }

    Ok(report)
}

/// Decode one parsed sheet and write its data file.
pub fn publish_sheet(
    source: &SheetSource,
    csv: &ParseResult,
) -> DataFileResult<(SheetReport, Diagnostics)> {
    let decoded = decode_rows(&csv.rows);
    let mut diagnostics = decoded.diagnostics;

    for skipped in &decoded.skipped {
        diagnostics.info(format!(
            "{}: row {} dropped: {}",
            source.name, skipped.row, skipped.reason
        ));
    }

    let path = write_data_file(&source.path, &source.name, &decoded.records)?;
    diagnostics.success(format!(
        "{}: {} records written to {}",
        source.name,
        decoded.records.len(),
        path.display()
    ));

    let report = SheetReport {
        name: source.name.clone(),
        path,
        row_count: csv.rows.len(),
        record_count: decoded.records.len(),
        skipped_count: decoded.skipped.len(),
    };
    Ok((report, diagnostics))
}

/// Decode a local CSV export.
pub fn decode_csv_file(path: &Path) -> PipelineResult<DecodeResult> {
    let csv = parse_csv_file_auto(path)?;

    let mut result = decode_rows(&csv.rows);
    result.diagnostics.info(format!(
        "Read {} rows ({}), {} columns",
        csv.rows.len(),
        csv.encoding,
        csv.headers.len()
    ));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datafile::parse_js_var;
    use crate::parser::parse_csv_str;
    use serde_json::json;
    use std::fs;

    fn source(dir: &Path, name: &str) -> SheetSource {
        SheetSource {
            key: "abc".into(),
            gid: 0,
            name: name.into(),
            path: dir.to_path_buf(),
        }
    }

    #[test]
    fn test_publish_sheet_writes_decoded_records() {
        let dir = tempfile::tempdir().unwrap();
        let csv = parse_csv_str(
            "id,title,loc.0,people.0.id,people.0.name\n\
             2,Klingon science,Boardroom,1,Alan Anderson\n\
             ,Orphan,Salon 8,,\n",
        )
        .unwrap();

        let (report, diagnostics) = publish_sheet(&source(dir.path(), "program"), &csv).unwrap();

        assert_eq!(report.row_count, 2);
        assert_eq!(report.record_count, 1);
        assert_eq!(report.skipped_count, 1);
        assert!(report.path.ends_with("program.js"));
        assert!(!diagnostics.is_empty());

        let content = fs::read_to_string(&report.path).unwrap();
        let (name, value) = parse_js_var(&content).unwrap();
        assert_eq!(name, "program");
        assert_eq!(
            value,
            json!([{
                "id": "2",
                "title": "Klingon science",
                "loc": ["Boardroom"],
                "people": [{ "id": "1", "name": "Alan Anderson" }]
            }])
        );
    }

    #[test]
    fn test_publish_sheet_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let csv = parse_csv_str("id,name\n1,Ann\n").unwrap();
        let missing = source(&dir.path().join("nope"), "people");

        assert!(publish_sheet(&missing, &csv).is_err());
    }

    #[test]
    fn test_decode_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("people.csv");
        fs::write(&path, "id,name,prog.0,prog.1\n1,Ann,2,\n2,Bob,,\n").unwrap();

        let result = decode_csv_file(&path).unwrap();

        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0]["prog"], json!(["2"]));
        assert!(result.records[1].get("prog").is_none());
    }

    #[tokio::test]
    async fn test_sync_without_active_sheets() {
        let config = SyncConfig::from_json(r#"{ "sheets": [{ "key": "", "name": "program" }] }"#).unwrap();
        assert!(matches!(sync_sheets(&config).await, Err(PipelineError::EmptyInput)));
    }
}
