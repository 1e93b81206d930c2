//! Batch INSERT construction.
//!
//! Records become one value tuple each, in input order. The batch is
//! all-or-nothing: the first record that fails aborts the statement.

use crate::error::{TransformError, TransformResult};
use crate::models::{present_cell, Record, UNIDENTIFIED_RECORD};
use crate::sql::SqlLiteral;

use super::mapping::ImportMapping;

/// Identifier of a record, for error messages.
fn record_label(record: &Record, mapping: &ImportMapping) -> String {
    present_cell(record, &mapping.identifier)
        .map(|id| id.into_owned())
        .unwrap_or_else(|| UNIDENTIFIED_RECORD.to_string())
}

/// Compute the literals of one record, in mapping column order.
///
/// Fails if a mandatory source column is missing or empty.
pub fn build_values(
    index: usize,
    record: &Record,
    mapping: &ImportMapping,
) -> TransformResult<Vec<SqlLiteral>> {
    let label = record_label(record, mapping);

    if let Some(field) = mapping
        .required
        .iter()
        .find(|column| present_cell(record, column).is_none())
    {
        return Err(TransformError::MissingField {
            position: index + 1,
            record: label,
            field: field.clone(),
        });
    }

    mapping
        .columns
        .iter()
        .map(|column| column.rule.evaluate(index, record, &label))
        .collect()
}

/// Render one parenthesized value tuple.
fn render_tuple(values: &[SqlLiteral]) -> String {
    let body: Vec<&str> = values.iter().map(SqlLiteral::as_str).collect();
    format!("(\n  {}\n)", body.join(",\n  "))
}

/// Build a single `INSERT INTO ... VALUES ...;` statement for all records.
///
/// Errors on an empty batch or on the first record missing a mandatory
/// field; nothing partial is returned.
///
/// # Example
/// ```
/// use crosswalk::{build_insert, ImportMapping, ColumnRule};
/// use serde_json::json;
///
/// let mapping = ImportMapping::new("controls", "controls")
///     .column("title", ColumnRule::Text { source: "Title".into() })
///     .column("sort_order", ColumnRule::SortOrder);
/// let record = json!({
///     "Control ID": "SEC-01", "Domain": "Security",
///     "Title": "Key's rotation", "Specification": "Rotate keys."
/// });
/// let sql = build_insert(&[record.as_object().unwrap().clone()], &mapping).unwrap();
/// assert!(sql.starts_with("INSERT INTO controls (\n  title,\n  sort_order\n) VALUES\n"));
/// assert!(sql.contains("'Key''s rotation'"));
/// assert!(sql.ends_with(");"));
/// ```
pub fn build_insert(records: &[Record], mapping: &ImportMapping) -> TransformResult<String> {
    if records.is_empty() {
        return Err(TransformError::EmptyBatch(mapping.table.clone()));
    }

    let tuples = records
        .iter()
        .enumerate()
        .map(|(index, record)| build_values(index, record, mapping).map(|v| render_tuple(&v)))
        .collect::<TransformResult<Vec<String>>>()?;

    let column_list: Vec<String> = mapping
        .column_names()
        .iter()
        .map(|name| format!("  {}", name))
        .collect();

    Ok(format!(
        "INSERT INTO {} (\n{}\n) VALUES\n{};",
        mapping.table,
        column_list.join(",\n"),
        tuples.join(",\n")
    ))
}

/// Wrap the statement in the comment header and footer of an import file.
///
/// `source` names the input in the header when given.
pub fn render_script(
    records: &[Record],
    mapping: &ImportMapping,
    source: Option<&str>,
) -> TransformResult<String> {
    let statement = build_insert(records, mapping)?;
    let description = if mapping.description.is_empty() {
        "records"
    } else {
        mapping.description.as_str()
    };

    let mut lines = vec![format!("-- Import {} into {}", description, mapping.table)];
    if let Some(source) = source {
        lines.push(format!("-- Generated from {}", source));
    }
    lines.push(String::new());
    lines.push("-- Clear existing data (optional - uncomment if needed)".to_string());
    lines.push(format!("-- DELETE FROM {};", mapping.table));
    lines.push(String::new());
    lines.push(statement);
    lines.push(String::new());
    lines.push(format!(
        "-- Successfully imported {} {}",
        records.len(),
        description
    ));

    Ok(lines.join("\n"))
}
