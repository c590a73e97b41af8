//! Transformation module.
//!
//! This module turns sheet rows into KonOpas records:
//! - Path: Parsing of dotted column names
//! - Decoder: Flat rows to nested records
//! - Pipeline: Fetch, decode and publish

pub mod decoder;
pub mod path;
pub mod pipeline;

pub use decoder::{decode, decode_row, decode_rows, DecodeResult, SkippedRow, ID_FIELD};
pub use path::{ColumnName, ColumnPath};
pub use pipeline::*;
