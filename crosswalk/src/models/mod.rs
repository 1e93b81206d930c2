//! Domain models for control data.
//!
//! - [`Record`] - one raw row, column name to cell value
//! - [`ControlRecord`] - typed view of a crosswalk row
//! - [`columns`] - source header names used by the crosswalk workbook

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

use crate::classify::{classify_pillar, classify_risk_opt};
use crate::error::{TransformError, TransformResult};
use crate::sql::split_list_field;

/// One raw row: column name to cell value. Absent or `null` means missing.
pub type Record = Map<String, Value>;

// =============================================================================
// Source Columns
// =============================================================================

/// Header names of the crosswalk workbook.
pub mod columns {
    pub const CONTROL_ID: &str = "Control ID";
    pub const DOMAIN: &str = "Domain";
    pub const TITLE: &str = "Title";
    pub const SPECIFICATION: &str = "Specification";
    pub const CONTROL_TYPE: &str = "Control Type";
    pub const LIFECYCLE_PHASE: &str = "Lifecycle Phase";
    pub const ROLE_APPLICABILITY: &str = "Role Applicability";
    pub const THREAT_VECTOR: &str = "Threat Vector";
    pub const EU_ARTICLE: &str = "EU Article";
    pub const EU_ANNEX: &str = "EU Annex";
    pub const MAPPING_RATIONALE: &str = "Mapping Rationale";
    pub const NIST_REF: &str = "NIST Ref";
    pub const COBIT_REF: &str = "COBIT Ref";
    pub const ISO_REF: &str = "ISO Ref";
    pub const VALIDATION_SCALE: &str = "Validation Scale";
    pub const EVIDENCE_REQUIRED: &str = "Evidence Required";

    /// Columns every record must carry.
    pub const MANDATORY: [&str; 4] = [CONTROL_ID, TITLE, DOMAIN, SPECIFICATION];
}

/// Label used for a record whose identifier is missing.
pub const UNIDENTIFIED_RECORD: &str = "<no id>";

/// Read a cell as text.
///
/// Strings are returned as-is (possibly empty), numbers and booleans are
/// rendered, `null`, arrays, objects and absent cells are `None`.
pub fn cell<'a>(record: &'a Record, column: &str) -> Option<Cow<'a, str>> {
    match record.get(column)? {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        _ => None,
    }
}

/// Read a cell, treating empty strings as missing.
pub fn present_cell<'a>(record: &'a Record, column: &str) -> Option<Cow<'a, str>> {
    cell(record, column).filter(|v| !v.is_empty())
}

// =============================================================================
// Control Record
// =============================================================================

/// Typed view of one crosswalk row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ControlRecord {
    pub control_id: String,
    pub domain: String,
    pub title: String,
    pub specification: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_type: Option<String>,
    #[serde(default)]
    pub lifecycle_phase: Vec<String>,
    #[serde(default)]
    pub role_applicability: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threat_vector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eu_article: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eu_annex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapping_rationale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nist_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cobit_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iso_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_scale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_required: Option<String>,
}

impl ControlRecord {
    /// Build the typed view. Returns the first missing mandatory column on failure.
    pub fn from_record(record: &Record) -> Result<Self, &'static str> {
        let required = |column: &'static str| {
            present_cell(record, column)
                .map(Cow::into_owned)
                .ok_or(column)
        };
        let optional = |column: &str| present_cell(record, column).map(Cow::into_owned);

        Ok(Self {
            control_id: required(columns::CONTROL_ID)?,
            domain: required(columns::DOMAIN)?,
            title: required(columns::TITLE)?,
            specification: required(columns::SPECIFICATION)?,
            control_type: optional(columns::CONTROL_TYPE),
            lifecycle_phase: split_list_field(cell(record, columns::LIFECYCLE_PHASE).as_deref()),
            role_applicability: split_list_field(
                cell(record, columns::ROLE_APPLICABILITY).as_deref(),
            ),
            threat_vector: optional(columns::THREAT_VECTOR),
            eu_article: optional(columns::EU_ARTICLE),
            eu_annex: optional(columns::EU_ANNEX),
            mapping_rationale: optional(columns::MAPPING_RATIONALE),
            nist_ref: optional(columns::NIST_REF),
            cobit_ref: optional(columns::COBIT_REF),
            iso_ref: optional(columns::ISO_REF),
            validation_scale: optional(columns::VALIDATION_SCALE),
            evidence_required: optional(columns::EVIDENCE_REQUIRED),
        })
    }

    /// Governance pillar derived from the identifier prefix.
    pub fn pillar(&self) -> &'static str {
        classify_pillar(&self.control_id)
    }

    /// Risk level derived from the validation-scale marker.
    pub fn risk_level(&self) -> &'static str {
        classify_risk_opt(self.validation_scale.as_deref())
    }
}

/// Convert raw records to typed controls, failing on the first record that
/// lacks a mandatory column.
pub fn controls_from_records(records: &[Record]) -> TransformResult<Vec<ControlRecord>> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            ControlRecord::from_record(record).map_err(|field| TransformError::MissingField {
                position: index + 1,
                record: present_cell(record, columns::CONTROL_ID)
                    .map(Cow::into_owned)
                    .unwrap_or_else(|| UNIDENTIFIED_RECORD.to_string()),
                field: field.to_string(),
            })
        })
        .collect()
}
