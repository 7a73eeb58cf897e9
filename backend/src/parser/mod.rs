//! Delimited-text reader with encoding and delimiter auto-detection.
//!
//! Turns an uploaded export into [`RawRecord`]s and resolves the required
//! invoice columns against its (trimmed) header row.

use std::path::Path;

use crate::error::{CsvError, CsvResult, SchemaError};
use crate::models::{RawRecord, REQUIRED_COLUMNS};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Data rows in input order
    pub records: Vec<RawRecord>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
    /// Column headers, trimmed
    pub headers: Vec<String>,
}

impl ParseResult {
    /// Resolve the required columns against the headers.
    pub fn required_columns(&self) -> Result<ColumnMap, SchemaError> {
        ColumnMap::resolve(&self.headers)
    }
}

/// Header indices of the required columns, in projection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub invoice: usize,
    pub customer_name: usize,
    pub product_name: usize,
    pub product_qty: usize,
}

impl ColumnMap {
    /// Locate every required column, reporting all that are absent at once.
    ///
    /// Matching ignores case and collapses runs of whitespace, so
    /// `" customer   NAME "` finds `Customer Name`. The first matching
    /// header wins when duplicates exist.
    pub fn resolve(headers: &[String]) -> Result<Self, SchemaError> {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();

        let mut found = [0usize; 4];
        let mut missing = Vec::new();
        for (slot, required) in REQUIRED_COLUMNS.iter().enumerate() {
            let wanted = normalize_header(required);
            match normalized.iter().position(|h| *h == wanted) {
                Some(idx) => found[slot] = idx,
                None => missing.push((*required).to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(SchemaError {
                missing,
                found: headers.to_vec(),
            });
        }

        Ok(Self {
            invoice: found[0],
            customer_name: found[1],
            product_name: found[2],
            product_qty: found[3],
        })
    }
}

/// Comparison form of a header: trimmed, lowercase, single spaces.
pub fn normalize_header(header: &str) -> String {
    header
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8(bytes.to_vec())
            .map_err(|e| CsvError::EncodingError(e.to_string())),
        "iso-8859-1" | "latin-1" | "latin1" => {
            Ok(encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned())
        }
        "windows-1252" | "cp1252" => Ok(encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()),
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(enc) => Ok(enc.decode(bytes).0.into_owned()),
            // Fallback: UTF-8 with replacement characters
            None => Ok(String::from_utf8_lossy(bytes).into_owned()),
        },
    }
}

/// Decode input bytes, honouring a UTF-8 byte-order marker.
///
/// Returns the text and the name of the encoding used.
pub fn decode_auto(bytes: &[u8]) -> CsvResult<(String, String)> {
    if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
        let text = decode_content(rest, "utf-8")?;
        return Ok((text, "utf-8-sig".to_string()));
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok((text.to_string(), "utf-8".to_string()));
    }

    let encoding = detect_encoding(bytes);
    let text = decode_content(bytes, &encoding)?;
    Ok((text, encoding))
}

/// Detect the delimiter by counting occurrences in the first line,
/// outside double-quoted fields.
///
/// Ties go to the earlier candidate, so a single-column file reads as
/// comma-separated.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = count_unquoted(first_line, sep);
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

fn count_unquoted(line: &str, sep: char) -> usize {
    let mut quoted = false;
    line.chars()
        .filter(|&c| {
            if c == '"' {
                quoted = !quoted;
            }
            !quoted && c == sep
        })
        .count()
}

/// Parse decoded text with an explicit delimiter.
pub fn parse_str(content: &str, delimiter: char, encoding: String) -> CsvResult<ParseResult> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }
    if !delimiter.is_ascii() {
        return Err(CsvError::InvalidDelimiter(delimiter));
    }
    let delim = delimiter as u8;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delim)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(CsvError::NoHeaders);
    }

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }

        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);
        let mut fields: Vec<String> = record.iter().map(str::to_string).collect();
        fields.resize(headers.len().max(fields.len()), String::new());
        records.push(RawRecord::new(line, fields));
    }

    Ok(ParseResult {
        records,
        encoding,
        delimiter,
        headers,
    })
}

/// Parse CSV bytes, detecting the delimiter unless one is given.
pub fn parse_bytes(bytes: &[u8], delimiter: Option<char>) -> CsvResult<ParseResult> {
    if bytes.is_empty() {
        return Err(CsvError::EmptyFile);
    }
    let (content, encoding) = decode_auto(bytes)?;
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));
    parse_str(&content, delimiter, encoding)
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> CsvResult<ParseResult> {
    parse_bytes(bytes, None)
}

/// Parse a CSV file with auto-detection of encoding and delimiter.
///
/// # Example
/// ```ignore
/// let result = parse_csv_file_auto("/path/to/orders.csv")?;
/// println!("Encoding: {}, Delimiter: '{}'", result.encoding, result.delimiter);
/// println!("Records: {}", result.records.len());
/// ```
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_simple_csv() {
        let csv = "name,age\nAlice,30\nBob,25";
        let result = parse_bytes_auto(csv.as_bytes()).unwrap();

        assert_eq!(result.delimiter, ',');
        assert_eq!(result.headers, vec!["name", "age"]);
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0].get(0), "Alice");
        assert_eq!(result.records[1].get(1), "25");
        assert_eq!(result.records[1].line, 3);
    }

    #[test]
    fn test_bom_is_stripped() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"Invoice,Product Qty\nA1,3\n");
        let result = parse_bytes_auto(&bytes).unwrap();

        assert_eq!(result.encoding, "utf-8-sig");
        assert_eq!(result.headers[0], "Invoice");
    }

    #[test]
    fn test_headers_are_trimmed() {
        let csv = " Invoice ,  Customer Name\nA1,Alice";
        let result = parse_bytes_auto(csv.as_bytes()).unwrap();
        assert_eq!(result.headers, vec!["Invoice", "Customer Name"]);
    }

    #[test]
    fn test_quoted_values_keep_delimiters() {
        let csv = "name,address\n\"Alice\",\"1 Main St, Springfield\"";
        let result = parse_bytes_auto(csv.as_bytes()).unwrap();
        assert_eq!(result.records[0].get(1), "1 Main St, Springfield");
    }

    #[test]
    fn test_blank_lines_skipped() {
        let csv = "a,b\n1,2\n\n , \n3,4\n";
        let result = parse_bytes_auto(csv.as_bytes()).unwrap();
        assert_eq!(result.records.len(), 2);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let csv = "a,b,c\n1";
        let result = parse_bytes_auto(csv.as_bytes()).unwrap();
        assert_eq!(result.records[0].fields, vec!["1", "", ""]);
    }

    #[test]
    fn test_header_only_has_no_records() {
        let csv = "Invoice,Customer Name,Product Name,Product Qty\n";
        let result = parse_bytes_auto(csv.as_bytes()).unwrap();
        assert!(result.records.is_empty());
        assert!(result.required_columns().is_ok());
    }

    #[test]
    fn test_empty_input_error() {
        assert!(matches!(parse_bytes_auto(b""), Err(CsvError::EmptyFile)));
        assert!(matches!(parse_bytes_auto(b"  \n"), Err(CsvError::EmptyFile)));
    }

    #[test]
    fn test_detect_delimiter_semicolon() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
    }

    #[test]
    fn test_detect_delimiter_comma() {
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
    }

    #[test]
    fn test_detect_delimiter_tab() {
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
    }

    #[test]
    fn test_detect_delimiter_ignores_quoted_separators() {
        let csv = "Invoice,Customer Name,Product Name,Product Qty,\"a;b;c;d;e;f\"\n\
                   A1,Alice,Pad,5,x\n";
        assert_eq!(detect_delimiter(csv), ',');

        let result = parse_bytes_auto(csv.as_bytes()).unwrap();
        assert_eq!(result.headers[4], "a;b;c;d;e;f");
        assert!(result.required_columns().is_ok());
    }

    #[test]
    fn test_detect_delimiter_single_column() {
        assert_eq!(detect_delimiter("Invoice\nA1"), ',');
    }

    #[test]
    fn test_explicit_delimiter_overrides_detection() {
        let csv = "a;b,c\n1;2,3";
        let result = parse_bytes(csv.as_bytes(), Some(';')).unwrap();
        assert_eq!(result.headers, vec!["a", "b,c"]);
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let err = parse_bytes(b"a,b\n1,2", Some('§')).unwrap_err();
        assert!(matches!(err, CsvError::InvalidDelimiter('§')));
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_resolve_columns_any_order_and_case() {
        let map = ColumnMap::resolve(&headers(&[
            "product qty",
            "Extra",
            "INVOICE",
            "Customer  Name",
            "Product Name",
        ]))
        .unwrap();

        assert_eq!(map.invoice, 2);
        assert_eq!(map.customer_name, 3);
        assert_eq!(map.product_name, 4);
        assert_eq!(map.product_qty, 0);
    }

    #[test]
    fn test_resolve_columns_reports_all_missing() {
        let err = ColumnMap::resolve(&headers(&["Invoice", "Customer Name"])).unwrap_err();
        assert_eq!(err.missing, vec!["Product Name", "Product Qty"]);
        assert_eq!(err.found, vec!["Invoice", "Customer Name"]);
    }
}
