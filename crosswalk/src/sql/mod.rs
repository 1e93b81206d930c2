//! SQL literal rendering.
//!
//! Only what the import scripts need: quote-doubled string literals,
//! `NULL`, integers and PostgreSQL `ARRAY[...]` literals of strings.
//! No backslash or control-character escaping is performed.

use std::fmt;

/// A rendered SQL literal, safe to splice verbatim into a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlLiteral(String);

impl SqlLiteral {
    /// The `NULL` literal.
    pub fn null() -> Self {
        Self("NULL".to_string())
    }

    /// Quote `value` as a string literal, doubling embedded single quotes.
    ///
    /// Unlike [`escape_scalar`], an empty string stays `''`.
    pub fn quoted(value: &str) -> Self {
        Self(format!("'{}'", value.replace('\'', "''")))
    }

    /// An unquoted integer literal.
    pub fn integer(value: usize) -> Self {
        Self(value.to_string())
    }

    pub fn is_null(&self) -> bool {
        self.0 == "NULL"
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reverse [`SqlLiteral::quoted`]. `None` for anything that is not a
    /// single string literal.
    pub fn unquote(&self) -> Option<String> {
        let inner = self.0.strip_prefix('\'')?.strip_suffix('\'')?;
        Some(inner.replace("''", "'"))
    }
}

impl fmt::Display for SqlLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Escape an optional scalar: `NULL` when missing or empty, otherwise a
/// quoted literal.
///
/// # Example
/// ```
/// use crosswalk::escape_scalar;
///
/// assert_eq!(escape_scalar(None).as_str(), "NULL");
/// assert_eq!(escape_scalar(Some("")).as_str(), "NULL");
/// assert_eq!(escape_scalar(Some("O'Brien")).as_str(), "'O''Brien'");
/// ```
pub fn escape_scalar(value: Option<&str>) -> SqlLiteral {
    match value {
        None | Some("") => SqlLiteral::null(),
        Some(v) => SqlLiteral::quoted(v),
    }
}

/// Split a list-valued cell.
///
/// The first delimiter present wins, checked in the order comma,
/// semicolon, pipe. A cell mixing delimiters is only split on the first
/// one found. Items are trimmed and empties dropped.
pub fn split_list_field(value: Option<&str>) -> Vec<String> {
    let value = match value {
        Some(v) => v,
        None => return Vec::new(),
    };

    let items: Vec<&str> = match [',', ';', '|'].into_iter().find(|d| value.contains(*d)) {
        Some(delimiter) => value.split(delimiter).collect(),
        None => vec![value],
    };

    items
        .into_iter()
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

/// Render items as `ARRAY['a', 'b']`, or `NULL` for an empty list.
pub fn format_array_literal(items: &[String]) -> SqlLiteral {
    if items.is_empty() {
        return SqlLiteral::null();
    }

    let quoted: Vec<String> = items
        .iter()
        .map(|item| SqlLiteral::quoted(item).0)
        .collect();
    SqlLiteral(format!("ARRAY[{}]", quoted.join(", ")))
}
