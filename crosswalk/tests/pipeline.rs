use crosswalk::{generate, GenerateOptions, ImportMapping, PipelineError, TableKind, TransformError};
use std::fs;
use tempfile::TempDir;

const CROSSWALK_CSV: &str = "\
Control ID,Domain,Title,Specification,Control Type,Lifecycle Phase,Role Applicability,Threat Vector,EU Article,EU Annex,Mapping Rationale,NIST Ref,COBIT Ref,ISO Ref,Validation Scale,Evidence Required
DAT-001,Data Governance & Quality,Dataset lineage,\"Ensure policy, testing, and documentation per Art 10.\",Preventive,\"Design, Development\",Data Scientist; ML Engineer,Data quality issues,Art 10,Annex IV §2,Direct mapping,GV-1,BAI06.02,ISO/IEC 27001 §6.1,\u{1F7E2},Policy and test records.
SEC-07,Security & Privacy,Provider's key rotation,Rotate signing keys.,Detective,Deployment,,Key compromise,Art 15,,,,,,\u{1F534},
ZZZ-01,Security & Privacy,Unmapped control,Catch-all.,,,,,,,,,,,,
";

fn write_input(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("crosswalk.csv");
    fs::write(&path, content).unwrap();
    path
}

fn tuple_count(sql: &str) -> usize {
    sql.matches("\n(\n").count()
}

#[test]
fn ai_controls_script_written() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, CROSSWALK_CSV);
    let output = dir.path().join("import_ai_controls.sql");

    let options = GenerateOptions::new(&input, TableKind::AiControls.mapping()).with_output(&output);
    let result = generate(&options).unwrap();

    assert_eq!(result.row_count, 3);
    assert_eq!(result.summary.total, 3);
    assert_eq!(result.summary.domains["Security & Privacy"], 2);

    let written = fs::read_to_string(&output).unwrap();
    assert_eq!(written, result.script);
    assert_eq!(tuple_count(&written), 3);
    assert!(written.contains("'Ensure policy, testing, and documentation per Art 10.'"));
    assert!(written.contains("ARRAY['Design', 'Development']"));
    assert!(written.contains("ARRAY['Data Scientist', 'ML Engineer']"));
    assert!(written.contains("'Provider''s key rotation'"));
    assert!(written.ends_with("-- Successfully imported 3 AI controls"));

    let dat = written.find("'DAT-001'").unwrap();
    let sec = written.find("'SEC-07'").unwrap();
    let zzz = written.find("'ZZZ-01'").unwrap();
    assert!(dat < sec && sec < zzz);
}

#[test]
fn governance_controls_derived_columns() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, CROSSWALK_CSV);

    let options = GenerateOptions::new(&input, TableKind::GovernanceControls.mapping());
    let result = generate(&options).unwrap();
    let sql = &result.script;

    assert!(result.output.is_none());
    assert!(sql.contains("INSERT INTO governance_controls (\n  control_name,"));
    assert!(sql.contains(
        "'EU AI Act Art 10 | Annex IV §2 | NIST GV-1 | COBIT BAI06.02 | ISO/IEC 27001 §6.1 | Rationale: Direct mapping'"
    ));
    assert!(sql.contains("'Security',\n  'High Risk'"));
    assert!(sql.contains("'Accountability',\n  'Low Risk'"));
    // Unknown prefix and no marker fall back to defaults.
    assert!(sql.contains("'Accountability',\n  'General Risk',\n  'Catch-all.'"));
    assert!(sql.contains("'Documentation and audit trail required.',\n  NULL,\n  3\n);"));
}

#[test]
fn missing_input_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.sql");

    let options = GenerateOptions::new(dir.path().join("absent.csv"), TableKind::AiControls.mapping())
        .with_output(&output);
    let err = generate(&options).unwrap_err();

    assert!(matches!(err, PipelineError::MissingInput(_)));
    assert!(!output.exists());
}

#[test]
fn missing_mandatory_field_aborts_batch() {
    let dir = TempDir::new().unwrap();
    let csv = "\
Control ID,Domain,Title,Specification
GOV-01,Governance,First,Spec one
GOV-02,Governance,,Spec two
";
    let input = write_input(&dir, csv);
    let output = dir.path().join("out.sql");

    let options = GenerateOptions::new(&input, TableKind::GovernanceControls.mapping())
        .with_output(&output);
    let err = generate(&options).unwrap_err();

    match err {
        PipelineError::Transform(TransformError::MissingField { record, field, position }) => {
            assert_eq!(record, "GOV-02");
            assert_eq!(field, "Title");
            assert_eq!(position, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!output.exists());
}

#[test]
fn missing_field_position_skips_blank_rows() {
    let dir = TempDir::new().unwrap();
    let csv = "\
Control ID,Domain,Title,Specification
GOV-01,Governance,First,Spec one
,,,
GOV-02,Governance,Second,
";
    let input = write_input(&dir, csv);

    let err = generate(&GenerateOptions::new(&input, TableKind::GovernanceControls.mapping()))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Transform error: Record #2 (GOV-02) is missing mandatory field 'Specification'"
    );
}

#[test]
fn header_only_input_is_empty_batch() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "Control ID,Domain,Title,Specification\n");

    let options = GenerateOptions::new(&input, TableKind::AiControls.mapping());
    let err = generate(&options).unwrap_err();
    assert!(matches!(err, PipelineError::Transform(TransformError::EmptyBatch(_))));
}

#[test]
fn semicolon_export_with_custom_mapping() {
    let dir = TempDir::new().unwrap();
    let csv = "Control ID;Domain;Title;Specification;Lifecycle Phase\nMON-03;Monitoring;Drift alerts;Alert on drift.;Operate|Retire\n";
    let input = write_input(&dir, csv);

    let mapping_path = dir.path().join("mapping.json");
    fs::write(
        &mapping_path,
        r#"{
            "table": "control_index",
            "description": "indexed controls",
            "columns": [
                { "name": "code", "rule": { "type": "required_text", "source": "Control ID" } },
                { "name": "phases", "rule": { "type": "list", "source": "Lifecycle Phase" } },
                { "name": "pillar", "rule": { "type": "pillar", "source": "Control ID" } },
                { "name": "position", "rule": { "type": "sort_order" } }
            ]
        }"#,
    )
    .unwrap();
    let mapping = ImportMapping::from_file(&mapping_path).unwrap();

    let result = generate(&GenerateOptions::new(&input, mapping)).unwrap();
    let expected_statement = "\
INSERT INTO control_index (
  code,
  phases,
  pillar,
  position
) VALUES
(
  'MON-03',
  ARRAY['Operate', 'Retire'],
  'Monitoring',
  1
);";
    assert!(result.script.contains(expected_statement));
    assert!(result.script.ends_with("-- Successfully imported 1 indexed controls"));
}
