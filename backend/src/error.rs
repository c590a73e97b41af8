//! Error types for the KonOpas data tools.
//!
//! The decoding and grid-building core never fails on malformed input; it
//! degrades to best-effort output plus diagnostics. The errors below belong
//! to the collaborators around the core:
//!
//! - [`CsvError`] - CSV reading errors
//! - [`FetchError`] - Google Sheets download errors
//! - [`DataFileError`] - KonOpas `var name = [...]` data file errors
//! - [`ConfigError`] - Configuration loading errors
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// CSV Reading Errors
// =============================================================================

/// Errors during CSV reading.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to decode the file contents.
    #[error("Failed to decode content: {0}")]
    EncodingError(String),

    /// Invalid CSV format.
    #[error("Invalid CSV format at line {line}: {message}")]
    ParseError { line: u64, message: String },

    /// Empty input.
    #[error("CSV input is empty")]
    EmptyFile,

    /// No usable headers found.
    #[error("No headers found in CSV")]
    NoHeaders,
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        CsvError::ParseError {
            line,
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Fetch Errors
// =============================================================================

/// Errors while downloading a sheet as CSV.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Non-success status code.
    #[error("Sheet {name} returned HTTP status {status}")]
    BadStatus { name: String, status: u16 },

    /// The export returned a login/permission page instead of CSV.
    #[error(
        "Sheet {0}: CSV content appears to be an HTML page. Please set document permissions \
         to be publicly accessible via link without any username or password."
    )]
    HtmlPayload(String),

    /// Timeout.
    #[error("Request timed out")]
    Timeout,

    /// The downloaded CSV could not be read.
    #[error("Sheet {name}: {source}")]
    Csv {
        name: String,
        #[source]
        source: CsvError,
    },
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::HttpError(err.to_string())
        }
    }
}

// =============================================================================
// Data File Errors
// =============================================================================

/// Errors reading or writing KonOpas JavaScript data files.
#[derive(Debug, Error)]
pub enum DataFileError {
    /// The file is not of the form `var name = ...;`.
    #[error("Not a KonOpas data file: expected `var {0} = ...`")]
    MissingVariable(String),

    /// JSON error.
    #[error("Data file JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// IO error.
    #[error("Data file IO error: {0}")]
    IoError(#[from] std::io::Error),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error.
    #[error("Config IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error.
    #[error("Config JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid field value.
    #[error("Invalid value for field '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by [`crate::transform::pipeline::sync_sheets`]
/// and [`crate::schedule::build_pocket_schedule`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV reading error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Sheet download error.
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Data file error.
    #[error("Data file error: {0}")]
    DataFile(#[from] DataFileError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Nothing configured to process.
    #[error("No sheets configured")]
    EmptyInput,
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Result type for data file operations.
pub type DataFileResult<T> = Result<T, DataFileError>;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
