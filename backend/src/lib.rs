//! # KonOpas tools - Google Sheets to KonOpas data files and pocket schedules
//!
//! Convention programs are edited in a spreadsheet whose column names encode
//! nesting (`loc.0`, `people.0.name`). This crate turns those rows into the
//! nested records the KonOpas schedule app loads, and lays the program out as
//! a printable per-day grid.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Google Sheet│────▶│   Parser    │────▶│   Decoder   │────▶│  program.js │
//! │  (CSV tab)  │     │  (ragged)   │     │ (col paths) │     │  people.js  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                                    │
//!                     ┌─────────────┐     ┌─────────────┐            │
//!                     │ pocket.html │◀────│ Grid builder│◀───────────┘
//!                     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use konopas::{decode, RawRow};
//!
//! let row = RawRow::from_pairs([("id", "2"), ("loc.0", "Salon 8"), ("people.0.name", "Alan")]);
//! let records = decode(&[row]);
//! assert_eq!(records[0]["people"][0]["name"], "Alan");
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`diagnostics`] - Per-call warnings mirrored to `tracing`
//! - [`models`] - Raw rows, decoded records and programming items
//! - [`parser`] - CSV parsing with auto-detection
//! - [`transform`] - Column-path decoding and the sync pipeline
//! - [`schedule`] - Pocket schedule grids and HTML
//! - [`datafile`] - `var name = ...;` data files and AppCache stamping
//! - [`fetch`] - Google Sheets CSV export download
//! - [`config`] - Sync configuration

// Core modules
pub mod diagnostics;
pub mod error;
pub mod models;

// Configuration
pub mod config;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Pocket schedule
pub mod schedule;

// I/O
pub mod datafile;
pub mod fetch;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ConfigError, CsvError, DataFileError, FetchError, PipelineError, PipelineResult};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use diagnostics::{Diagnostic, Diagnostics, LogLevel};
pub use models::{DecodedRecord, Person, ProgrammingItem, RawRow};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content,
    detect_encoding,
    parse_bytes_auto,
    parse_csv,
    parse_csv_file_auto,
    parse_csv_str,
    ParseResult,
};

// =============================================================================
// Re-exports - Decoder
// =============================================================================

pub use transform::{decode, decode_row, decode_rows, ColumnName, ColumnPath, DecodeResult, SkippedRow};

// =============================================================================
// Re-exports - Grid Builder
// =============================================================================

pub use schedule::{
    build_grid,
    build_pocket_schedule,
    render_html,
    ClockTime,
    DayGrid,
    Event,
    GridCell,
    GridOptions,
    GridRow,
    Schedule,
};

// =============================================================================
// Re-exports - Data Files
// =============================================================================

pub use datafile::{parse_js_var, read_program, stamp_appcache, to_js_var, write_data_file};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use config::{SheetSource, SyncConfig};
pub use fetch::{export_url, FetchedSheet, SheetFetcher};
pub use transform::pipeline::{decode_csv_file, publish_sheet, sync_sheets, SheetReport, SyncReport};
