//! Import mapping definition
//!
//! A mapping names the target table and lists its columns in output order,
//! each with the rule that derives its SQL literal from a source record.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::classify::{
    lookup_pillar, lookup_risk, DEFAULT_PILLAR, DEFAULT_RISK_LEVEL, DEFAULT_VALIDATION_MARKER,
};
use crate::error::{MappingError, MappingResult, TransformError, TransformResult};
use crate::models::{cell, columns, present_cell, Record};
use crate::sql::{escape_scalar, format_array_literal, split_list_field, SqlLiteral};

/// Framework name written by the governance import.
pub const GOVERNANCE_FRAMEWORK: &str = "EU AI Act (2023)";

/// Evidence text used when a control has none.
pub const DEFAULT_EVIDENCE: &str = "Documentation and audit trail required.";

/// A complete import mapping for one target table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportMapping {
    /// Target table
    pub table: String,

    /// What is being imported, used in script comments ("AI controls")
    #[serde(default)]
    pub description: String,

    /// Source column naming each record in error messages
    #[serde(default = "default_identifier")]
    pub identifier: String,

    /// Source columns that must be present and non-empty on every record.
    /// Always includes [`columns::MANDATORY`]; extra columns may be added.
    #[serde(default = "default_required")]
    pub required: Vec<String>,

    /// Target columns, in statement order
    pub columns: Vec<ColumnMapping>,
}

fn default_identifier() -> String {
    columns::CONTROL_ID.to_string()
}

fn default_required() -> Vec<String> {
    columns::MANDATORY.iter().map(|c| c.to_string()).collect()
}

/// One target column and how to fill it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnMapping {
    /// Target column name
    pub name: String,

    /// Derivation rule
    pub rule: ColumnRule,
}

/// How a target value is derived from a record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnRule {
    /// Escaped source cell, `NULL` when missing or empty
    Text { source: String },

    /// Escaped source cell; the record is rejected when it is missing
    RequiredText { source: String },

    /// Escaped source cell, or `default` when missing or empty
    TextOrDefault { source: String, default: String },

    /// Delimited source cell rendered as a string array
    List { source: String },

    /// Same string on every row
    Constant { value: String },

    /// Risk level from a validation-scale column
    RiskLevel { source: String },

    /// Governance pillar from an identifier column
    Pillar { source: String },

    /// EU/NIST/COBIT/ISO references and rationale joined into one text
    RegulatoryReferences,

    /// 1-based position of the record in the batch
    SortOrder,
}

impl ColumnRule {
    /// Evaluate this rule for the record at 0-based position `index`.
    pub fn evaluate(&self, index: usize, record: &Record, label: &str) -> TransformResult<SqlLiteral> {
        let literal = match self {
            ColumnRule::Text { source } => escape_scalar(cell(record, source).as_deref()),

            ColumnRule::RequiredText { source } => match present_cell(record, source) {
                Some(value) => SqlLiteral::quoted(&value),
                None => {
                    return Err(TransformError::MissingField {
                        position: index + 1,
                        record: label.to_string(),
                        field: source.clone(),
                    })
                }
            },

            ColumnRule::TextOrDefault { source, default } => match present_cell(record, source) {
                Some(value) => SqlLiteral::quoted(&value),
                None => SqlLiteral::quoted(default),
            },

            ColumnRule::List { source } => {
                format_array_literal(&split_list_field(cell(record, source).as_deref()))
            }

            ColumnRule::Constant { value } => SqlLiteral::quoted(value),

            // Fallbacks are reported once by the pipeline audit, not per column.
            ColumnRule::RiskLevel { source } => {
                let marker = present_cell(record, source);
                let marker = marker.as_deref().unwrap_or(DEFAULT_VALIDATION_MARKER);
                SqlLiteral::quoted(lookup_risk(marker).unwrap_or(DEFAULT_RISK_LEVEL))
            }

            ColumnRule::Pillar { source } => {
                let identifier = present_cell(record, source).unwrap_or_default();
                SqlLiteral::quoted(lookup_pillar(&identifier).unwrap_or(DEFAULT_PILLAR))
            }

            ColumnRule::RegulatoryReferences => match regulatory_references(record) {
                Some(refs) => SqlLiteral::quoted(&refs),
                None => SqlLiteral::null(),
            },

            ColumnRule::SortOrder => SqlLiteral::integer(index + 1),
        };

        Ok(literal)
    }

    /// Source column this rule reads, if any.
    pub fn source(&self) -> Option<&str> {
        match self {
            ColumnRule::Text { source }
            | ColumnRule::RequiredText { source }
            | ColumnRule::TextOrDefault { source, .. }
            | ColumnRule::List { source }
            | ColumnRule::RiskLevel { source }
            | ColumnRule::Pillar { source } => Some(source.as_str()),
            ColumnRule::Constant { .. }
            | ColumnRule::RegulatoryReferences
            | ColumnRule::SortOrder => None,
        }
    }
}

/// Join the regulatory references of a record with ` | `.
///
/// Parts, in order: `EU AI Act <article>`, `<annex>`, `NIST <ref>`,
/// `COBIT <ref>`, `<ISO ref>`, `Rationale: <text>`. `None` when no part
/// is present.
pub fn regulatory_references(record: &Record) -> Option<String> {
    let parts: [(&str, &str); 6] = [
        (columns::EU_ARTICLE, "EU AI Act "),
        (columns::EU_ANNEX, ""),
        (columns::NIST_REF, "NIST "),
        (columns::COBIT_REF, "COBIT "),
        (columns::ISO_REF, ""),
        (columns::MAPPING_RATIONALE, "Rationale: "),
    ];

    let refs: Vec<String> = parts
        .iter()
        .filter_map(|(column, prefix)| {
            present_cell(record, column).map(|value| format!("{}{}", prefix, value))
        })
        .collect();

    if refs.is_empty() {
        None
    } else {
        Some(refs.join(" | "))
    }
}

impl ImportMapping {
    /// Create a mapping with default identifier and mandatory columns.
    pub fn new(table: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            description: description.into(),
            identifier: default_identifier(),
            required: default_required(),
            columns: Vec::new(),
        }
    }

    /// Append a column.
    pub fn column(mut self, name: impl Into<String>, rule: ColumnRule) -> Self {
        self.columns.push(ColumnMapping {
            name: name.into(),
            rule,
        });
        self
    }

    /// Parse and validate a mapping from JSON.
    pub fn from_json(json: &str) -> MappingResult<Self> {
        let mapping: Self = serde_json::from_str(json)?;
        mapping.validate()?;
        Ok(mapping)
    }

    /// Load a mapping file.
    pub fn from_file(path: impl AsRef<Path>) -> MappingResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> MappingResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject mappings that cannot produce a statement.
    pub fn validate(&self) -> MappingResult<()> {
        if self.table.trim().is_empty() {
            return Err(MappingError::Invalid("table name is empty".into()));
        }
        if self.columns.is_empty() {
            return Err(MappingError::Invalid(format!("no columns for table '{}'", self.table)));
        }
        if let Some(column) = self.columns.iter().find(|c| c.name.trim().is_empty()) {
            return Err(MappingError::Invalid(format!("unnamed column with rule {:?}", column.rule)));
        }
        if let Some(missing) = columns::MANDATORY
            .iter()
            .find(|column| !self.required.iter().any(|r| r == *column))
        {
            return Err(MappingError::Invalid(format!(
                "mandatory column '{}' cannot be dropped from 'required'",
                missing
            )));
        }
        Ok(())
    }

    /// Target column names, in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// All source columns read by the mapping, sorted and deduplicated.
    pub fn source_columns(&self) -> Vec<String> {
        let mut sources: Vec<String> = self
            .columns
            .iter()
            .filter_map(|c| c.rule.source().map(String::from))
            .chain(self.required.iter().cloned())
            .collect();

        if self.columns.iter().any(|c| c.rule == ColumnRule::RegulatoryReferences) {
            sources.extend(
                [
                    columns::EU_ARTICLE,
                    columns::EU_ANNEX,
                    columns::NIST_REF,
                    columns::COBIT_REF,
                    columns::ISO_REF,
                    columns::MAPPING_RATIONALE,
                ]
                .iter()
                .map(|c| c.to_string()),
            );
        }

        sources.sort();
        sources.dedup();
        sources
    }

    /// Source columns read by the mapping but absent from `headers`.
    pub fn missing_sources(&self, headers: &[String]) -> Vec<String> {
        self.source_columns()
            .into_iter()
            .filter(|col| !headers.iter().any(|h| h == col))
            .collect()
    }
}

// =============================================================================
// Built-in Mappings
// =============================================================================

fn text(source: &str) -> ColumnRule {
    ColumnRule::Text { source: source.to_string() }
}

fn required_text(source: &str) -> ColumnRule {
    ColumnRule::RequiredText { source: source.to_string() }
}

fn list(source: &str) -> ColumnRule {
    ColumnRule::List { source: source.to_string() }
}

/// Every crosswalk column into `ai_controls`, one to one.
pub fn ai_controls_mapping() -> ImportMapping {
    ImportMapping::new("ai_controls", "AI controls")
        .column("control_id", required_text(columns::CONTROL_ID))
        .column("domain", required_text(columns::DOMAIN))
        .column("title", required_text(columns::TITLE))
        .column("specification", required_text(columns::SPECIFICATION))
        .column("control_type", text(columns::CONTROL_TYPE))
        .column("lifecycle_phase", list(columns::LIFECYCLE_PHASE))
        .column("role_applicability", list(columns::ROLE_APPLICABILITY))
        .column("threat_vector", text(columns::THREAT_VECTOR))
        .column("eu_article", text(columns::EU_ARTICLE))
        .column("eu_annex", text(columns::EU_ANNEX))
        .column("mapping_rationale", text(columns::MAPPING_RATIONALE))
        .column("nist_ref", text(columns::NIST_REF))
        .column("cobit_ref", text(columns::COBIT_REF))
        .column("iso_ref", text(columns::ISO_REF))
        .column("validation_scale", text(columns::VALIDATION_SCALE))
        .column("evidence_required", text(columns::EVIDENCE_REQUIRED))
}

/// Derived governance rows into `governance_controls`.
pub fn governance_controls_mapping() -> ImportMapping {
    ImportMapping::new("governance_controls", "governance controls")
        .column("control_name", required_text(columns::TITLE))
        .column("category", required_text(columns::DOMAIN))
        .column(
            "framework",
            ColumnRule::Constant { value: GOVERNANCE_FRAMEWORK.to_string() },
        )
        .column(
            "asimov_pillar",
            ColumnRule::Pillar { source: columns::CONTROL_ID.to_string() },
        )
        .column(
            "risk_level",
            ColumnRule::RiskLevel { source: columns::VALIDATION_SCALE.to_string() },
        )
        .column("description", required_text(columns::SPECIFICATION))
        .column(
            "evidence_requirements",
            ColumnRule::TextOrDefault {
                source: columns::EVIDENCE_REQUIRED.to_string(),
                default: DEFAULT_EVIDENCE.to_string(),
            },
        )
        .column("regulatory_references", ColumnRule::RegulatoryReferences)
        .column("sort_order", ColumnRule::SortOrder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_text_rule() {
        let r = record(json!({ "Threat Vector": "Model's drift", "Empty": "" }));
        let rule = text("Threat Vector");
        assert_eq!(rule.evaluate(0, &r, "X-01").unwrap().as_str(), "'Model''s drift'");
        assert!(text("Empty").evaluate(0, &r, "X-01").unwrap().is_null());
        assert!(text("Absent").evaluate(0, &r, "X-01").unwrap().is_null());
    }

    #[test]
    fn test_required_text_rule() {
        let r = record(json!({ "Title": "" }));
        let err = required_text("Title").evaluate(4, &r, "GOV-02").unwrap_err();
        match err {
            TransformError::MissingField { position, record, field } => {
                assert_eq!(position, 5);
                assert_eq!(record, "GOV-02");
                assert_eq!(field, "Title");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_default_evidence() {
        let rule = ColumnRule::TextOrDefault {
            source: columns::EVIDENCE_REQUIRED.into(),
            default: DEFAULT_EVIDENCE.into(),
        };
        let empty = record(json!({}));
        assert_eq!(
            rule.evaluate(0, &empty, "A-01").unwrap().as_str(),
            "'Documentation and audit trail required.'"
        );
        let given = record(json!({ "Evidence Required": "Signed SOP" }));
        assert_eq!(rule.evaluate(0, &given, "A-01").unwrap().as_str(), "'Signed SOP'");
    }

    #[test]
    fn test_list_rule() {
        let r = record(json!({ "Lifecycle Phase": "Design, Development", "Roles": "" }));
        assert_eq!(
            list("Lifecycle Phase").evaluate(0, &r, "A-01").unwrap().as_str(),
            "ARRAY['Design', 'Development']"
        );
        assert!(list("Roles").evaluate(0, &r, "A-01").unwrap().is_null());
    }

    #[test]
    fn test_classification_rules() {
        let r = record(json!({ "Control ID": "SEC-07", "Validation Scale": "\u{1F534}" }));
        let pillar = ColumnRule::Pillar { source: "Control ID".into() };
        let risk = ColumnRule::RiskLevel { source: "Validation Scale".into() };
        assert_eq!(pillar.evaluate(0, &r, "SEC-07").unwrap().as_str(), "'Security'");
        assert_eq!(risk.evaluate(0, &r, "SEC-07").unwrap().as_str(), "'High Risk'");

        let blank = record(json!({ "Control ID": "ZZZ-01" }));
        assert_eq!(pillar.evaluate(0, &blank, "ZZZ-01").unwrap().as_str(), "'Accountability'");
        assert_eq!(risk.evaluate(0, &blank, "ZZZ-01").unwrap().as_str(), "'General Risk'");
    }

    #[test]
    fn test_sort_order_is_one_based() {
        let r = record(json!({}));
        assert_eq!(ColumnRule::SortOrder.evaluate(0, &r, "").unwrap().as_str(), "1");
        assert_eq!(ColumnRule::SortOrder.evaluate(41, &r, "").unwrap().as_str(), "42");
    }

    #[test]
    fn test_regulatory_references_all_parts() {
        let r = record(json!({
            "EU Article": "Art 10",
            "EU Annex": "Annex IV §2",
            "NIST Ref": "GV-1",
            "COBIT Ref": "BAI06.02",
            "ISO Ref": "ISO/IEC 42001 §6.1",
            "Mapping Rationale": "Direct mapping"
        }));
        assert_eq!(
            regulatory_references(&r).unwrap(),
            "EU AI Act Art 10 | Annex IV §2 | NIST GV-1 | COBIT BAI06.02 | ISO/IEC 42001 §6.1 | Rationale: Direct mapping"
        );
    }

    #[test]
    fn test_regulatory_references_partial_and_empty() {
        let r = record(json!({ "NIST Ref": "MAP-2", "EU Article": "" }));
        assert_eq!(regulatory_references(&r).unwrap(), "NIST MAP-2");

        let none = record(json!({ "EU Article": "", "ISO Ref": null }));
        assert_eq!(regulatory_references(&none), None);
        assert!(ColumnRule::RegulatoryReferences.evaluate(0, &none, "").unwrap().is_null());
    }

    #[test]
    fn test_builtin_column_order() {
        assert_eq!(
            governance_controls_mapping().column_names(),
            vec![
                "control_name",
                "category",
                "framework",
                "asimov_pillar",
                "risk_level",
                "description",
                "evidence_requirements",
                "regulatory_references",
                "sort_order",
            ]
        );
        let ai = ai_controls_mapping();
        assert_eq!(ai.columns.len(), 16);
        assert_eq!(ai.column_names()[0], "control_id");
        assert_eq!(ai.column_names()[15], "evidence_required");
    }

    #[test]
    fn test_mapping_json_roundtrip() {
        let mapping = governance_controls_mapping();
        let json = mapping.to_json().unwrap();
        assert!(json.contains("\"type\": \"regulatory_references\""));
        assert_eq!(ImportMapping::from_json(&json).unwrap(), mapping);
    }

    #[test]
    fn test_mapping_json_defaults() {
        let json = r#"{
            "table": "controls",
            "columns": [
                { "name": "id", "rule": { "type": "required_text", "source": "Control ID" } },
                { "name": "pos", "rule": { "type": "sort_order" } }
            ]
        }"#;
        let mapping = ImportMapping::from_json(json).unwrap();
        assert_eq!(mapping.identifier, "Control ID");
        assert_eq!(mapping.required.len(), 4);
        assert_eq!(mapping.column_names(), vec!["id", "pos"]);
    }

    #[test]
    fn test_invalid_mappings_rejected() {
        let no_columns = r#"{ "table": "t", "columns": [] }"#;
        assert!(matches!(
            ImportMapping::from_json(no_columns),
            Err(MappingError::Invalid(_))
        ));

        let no_table = r#"{ "table": " ", "columns": [ { "name": "a", "rule": { "type": "sort_order" } } ] }"#;
        assert!(matches!(
            ImportMapping::from_json(no_table),
            Err(MappingError::Invalid(_))
        ));

        assert!(matches!(
            ImportMapping::from_json("{"),
            Err(MappingError::JsonError(_))
        ));
    }

    #[test]
    fn test_mandatory_columns_cannot_be_dropped() {
        let body = r#""columns": [ { "name": "pos", "rule": { "type": "sort_order" } } ]"#;

        let empty = format!(r#"{{ "table": "t", "required": [], {body} }}"#);
        assert!(matches!(
            ImportMapping::from_json(&empty),
            Err(MappingError::Invalid(ref msg)) if msg.contains("Control ID")
        ));

        let partial = format!(
            r#"{{ "table": "t", "required": ["Control ID", "Title", "Domain"], {body} }}"#
        );
        assert!(ImportMapping::from_json(&partial).is_err());

        let extended = format!(
            r#"{{ "table": "t", "required": ["Control ID", "Title", "Domain", "Specification", "NIST Ref"], {body} }}"#
        );
        assert_eq!(ImportMapping::from_json(&extended).unwrap().required.len(), 5);
    }

    #[test]
    fn test_missing_sources() {
        let headers = vec!["Control ID".to_string(), "Title".to_string(), "Domain".to_string()];
        let missing = ai_controls_mapping().missing_sources(&headers);
        assert!(missing.contains(&"Specification".to_string()));
        assert!(missing.contains(&"ISO Ref".to_string()));
        assert!(!missing.contains(&"Title".to_string()));

        let governance = governance_controls_mapping().source_columns();
        assert!(governance.contains(&"Mapping Rationale".to_string()));
    }
}
