//! CSV to raw rows, with encoding auto-detection for local files.
//!
//! Sheet exports are ragged: trailing empty cells are often missing, so
//! records of any length are accepted. Header cells that are purely numeric
//! (helper columns such as `1`, `2`, ...) are ignored along with their values.
//! No decoding of dotted column names happens here.

use std::io::Read;
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::models::RawRow;
use crate::transform::path::is_numeric;

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed rows in sheet order
    pub rows: Vec<RawRow>,
    /// Detected or used encoding
    pub encoding: String,
    /// Column headers that were kept
    pub headers: Vec<String>,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let text = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => String::from_utf8_lossy(bytes).to_string(),
        },
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.to_string(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.to_string(),
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(enc) => {
                let (text, _, had_errors) = enc.decode(bytes);
                if had_errors {
                    return Err(CsvError::EncodingError(format!(
                        "content is not valid {}",
                        enc.name()
                    )));
                }
                text.to_string()
            }
            None => String::from_utf8_lossy(bytes).to_string(),
        },
    };
    Ok(text)
}

/// Parse CSV text into rows.
///
/// # Example
/// ```ignore
/// use konopas::parse_csv_str;
///
/// let result = parse_csv_str("id,title,loc.0\n1,Opening,Salon 8").unwrap();
///
/// assert_eq!(result.rows.len(), 1);
/// assert_eq!(result.rows[0].get("loc.0"), Some("Salon 8"));
/// ```
pub fn parse_csv_str(content: &str) -> CsvResult<ParseResult> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }
    parse_csv(content.as_bytes(), "utf-8".to_string())
}

/// Parse CSV from a reader into rows.
pub fn parse_csv<R: Read>(reader: R, encoding: String) -> CsvResult<ParseResult> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    // (position in record, header name) for every usable column
    let columns: Vec<(usize, String)> = reader
        .headers()?
        .iter()
        .enumerate()
        .filter(|(_, name)| !name.is_empty() && !is_numeric(name))
        .map(|(i, name)| (i, name.to_string()))
        .collect();

    if columns.is_empty() {
        return Err(CsvError::NoHeaders);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row = RawRow::new();
        for (i, name) in &columns {
            row.insert(name.as_str(), record.get(*i).unwrap_or(""));
        }
        rows.push(row);
    }

    Ok(ParseResult {
        rows,
        encoding,
        headers: columns.into_iter().map(|(_, name)| name).collect(),
    })
}

/// Parse CSV file with auto-detection of encoding.
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}

/// Parse CSV bytes with auto-detection of encoding.
pub fn parse_bytes_auto(bytes: &[u8]) -> CsvResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;

    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }
    parse_csv(content.as_bytes(), encoding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let result = parse_csv_str("id,title\n1,Opening\n2,Closing").unwrap();

        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0].get("id"), Some("1"));
        assert_eq!(result.rows[0].get("title"), Some("Opening"));
        assert_eq!(result.rows[1].get("title"), Some("Closing"));
    }

    #[test]
    fn test_quoted_values_with_commas() {
        let result = parse_csv_str("id,desc\n1,\"Panels, games and more\"").unwrap();
        assert_eq!(result.rows[0].get("desc"), Some("Panels, games and more"));
    }

    #[test]
    fn test_ragged_rows() {
        let result = parse_csv_str("id,title,mins\n1,Opening\n2,Closing,60,extra").unwrap();

        assert_eq!(result.rows[0].get("mins"), Some(""));
        assert_eq!(result.rows[1].get("mins"), Some("60"));
        assert_eq!(result.rows[1].len(), 3);
    }

    #[test]
    fn test_numeric_headers_are_ignored() {
        let result = parse_csv_str("id,1,title,22\n7,x,Opening,y").unwrap();

        assert_eq!(result.headers, vec!["id", "title"]);
        assert_eq!(result.rows[0].get("1"), None);
        assert_eq!(result.rows[0].get("title"), Some("Opening"));
    }

    #[test]
    fn test_values_are_trimmed_and_order_kept() {
        let result = parse_csv_str("id , loc.0 ,people.0.name\n 1 , Salon 8 ,Alan ").unwrap();
        let pairs: Vec<(&str, &str)> = result.rows[0].iter().collect();
        assert_eq!(pairs, vec![("id", "1"), ("loc.0", "Salon 8"), ("people.0.name", "Alan")]);
    }

    #[test]
    fn test_empty_csv_error() {
        assert!(matches!(parse_csv_str(""), Err(CsvError::EmptyFile)));
    }

    #[test]
    fn test_only_numeric_headers_error() {
        assert!(matches!(parse_csv_str("1,2\na,b"), Err(CsvError::NoHeaders)));
    }

    #[test]
    fn test_auto_parse_with_bom() {
        let bytes = b"\xEF\xBB\xBFid,title\n1,Opening\n";
        let result = parse_bytes_auto(bytes).unwrap();

        assert_eq!(result.headers, vec!["id", "title"]);
        assert_eq!(result.rows.len(), 1);
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_malformed_multibyte_content_is_rejected() {
        // Shift_JIS lead byte with no trail byte
        let bytes: &[u8] = &[0x69, 0x64, 0x0A, 0x82];
        let err = decode_content(bytes, "shift_jis").unwrap_err();

        assert!(matches!(err, CsvError::EncodingError(_)));
        assert!(err.to_string().contains("Shift_JIS"));
    }

    #[test]
    fn test_valid_multibyte_content_decodes() {
        // "id\n\u{3042}" in Shift_JIS
        let bytes: &[u8] = &[0x69, 0x64, 0x0A, 0x82, 0xA0];
        assert_eq!(decode_content(bytes, "shift_jis").unwrap(), "id\n\u{3042}");
    }
}
