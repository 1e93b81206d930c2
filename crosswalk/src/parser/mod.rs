//! CSV loader with encoding and delimiter auto-detection.
//!
//! Reads a CSV export of the crosswalk workbook into ordered [`Record`]s.
//! Quoting follows RFC 4180 (via the `csv` crate), so specifications that
//! contain the delimiter survive as long as they are quoted.

use serde_json::Value;
use std::path::Path;
use tracing::debug;

use crate::error::{CsvError, CsvResult};
use crate::models::Record;

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed records, in file order
    pub records: Vec<Record>,
    /// Detected encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
    /// Column headers, in file order
    pub headers: Vec<String>,
}

/// Detect the encoding of raw bytes.
///
/// Valid UTF-8 is taken as UTF-8; anything else is guessed with chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "utf-8-sig" | "" => "utf-8".to_string(),
        "iso-8859-1" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "iso-8859-15" | "latin-9" | "latin9" => "iso-8859-15".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding.
///
/// ISO-8859-1 is decoded with the windows-1252 table, which agrees with it
/// over 0xA0-0xFF. Unknown encodings and invalid UTF-8 fall back to lossy
/// UTF-8. A leading byte order mark is dropped.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let decoded = match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        "iso-8859-15" | "latin-9" | "latin9" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };

    match decoded.strip_prefix('\u{FEFF}') {
        Some(rest) => rest.to_string(),
        None => decoded,
    }
}

/// Detect the delimiter by counting occurrences in the header line.
///
/// Falls back to `,` when the header contains none of the candidates.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV text with an explicit delimiter.
///
/// Returns headers and records. Cells and headers are trimmed, rows whose
/// cells are all empty are skipped, short rows are padded with `""` and
/// extra cells are ignored.
///
/// # Example
/// ```
/// use crosswalk::parser::parse_str;
///
/// let (headers, rows) = parse_str("Control ID,Title\nSEC-01,\"Keys, rotated\"", ',').unwrap();
/// assert_eq!(headers, vec!["Control ID", "Title"]);
/// assert_eq!(rows[0]["Title"], "Keys, rotated");
/// ```
pub fn parse_str(content: &str, delimiter: char) -> CsvResult<(Vec<String>, Vec<Record>)> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }
    if !delimiter.is_ascii() {
        return Err(CsvError::InvalidDelimiter(delimiter));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| CsvError::ParseError {
            line: 1,
            message: format!("Cannot read header: {}", e),
        })?
        .iter()
        .map(String::from)
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::NoHeaders);
    }

    let mut records = Vec::new();

    for result in reader.records() {
        let row = result.map_err(|e| CsvError::ParseError {
            line: e.position().map(|p| p.line()).unwrap_or(0),
            message: e.to_string(),
        })?;

        if row.iter().all(str::is_empty) {
            continue;
        }

        let mut record = Record::new();
        for (i, header) in headers.iter().enumerate() {
            if header.is_empty() {
                continue;
            }
            let value = row.get(i).unwrap_or("");
            record.insert(header.clone(), Value::String(value.to_string()));
        }
        records.push(record);
    }

    Ok((headers, records))
}

/// Parse CSV bytes, detecting encoding and, unless given, the delimiter.
pub fn parse_bytes(bytes: &[u8], delimiter: Option<char>) -> CsvResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));

    debug!(%encoding, ?delimiter, "decoded source");

    let (headers, records) = parse_str(&content, delimiter)?;

    Ok(ParseResult {
        records,
        encoding,
        delimiter,
        headers,
    })
}

/// Load a CSV file.
///
/// # Example
/// ```ignore
/// let result = crosswalk::load("EU_AI_AICM_Crosswalk_v6.csv", None)?;
/// println!("{} records, delimiter '{}'", result.records.len(), result.delimiter);
/// ```
pub fn load<P: AsRef<Path>>(path: P, delimiter: Option<char>) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes(&bytes, delimiter)
}
