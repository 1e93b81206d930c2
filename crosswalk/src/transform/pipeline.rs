//! High-level pipeline: CSV file to SQL import file.
//!
//! # Example
//!
//! ```rust,ignore
//! use crosswalk::{generate, GenerateOptions, TableKind};
//!
//! let options = GenerateOptions::new("EU_AI_AICM_Crosswalk_v6.csv", TableKind::GovernanceControls.mapping())
//!     .with_output("import_controls.sql");
//! let result = generate(&options)?;
//! println!("Wrote {} rows", result.row_count);
//! ```

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::classify::{is_well_formed_identifier, lookup_pillar, lookup_risk};
use crate::error::{PipelineError, PipelineResult};
use crate::models::{columns, present_cell, Record};
use crate::parser::load;
use crate::transform::insert::render_script;
use crate::transform::mapping::ImportMapping;

/// Options for one generation run
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// CSV export of the crosswalk
    pub input: PathBuf,

    /// Where to write the script; `None` returns it without writing
    pub output: Option<PathBuf>,

    /// Target table mapping
    pub mapping: ImportMapping,

    /// CSV delimiter (auto-detect if not specified)
    pub delimiter: Option<char>,
}

impl GenerateOptions {
    pub fn new(input: impl Into<PathBuf>, mapping: ImportMapping) -> Self {
        Self {
            input: input.into(),
            output: None,
            mapping,
            delimiter: None,
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_delimiter(mut self, delimiter: Option<char>) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// Record counts per domain
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DataSummary {
    pub total: usize,
    /// Domain to number of controls, sorted by domain
    pub domains: BTreeMap<String, usize>,
}

/// Result of a generation run
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResult {
    /// Rendered SQL script
    pub script: String,

    /// Number of value tuples emitted
    pub row_count: usize,

    /// Input summary
    pub summary: DataSummary,

    /// File written, if any
    pub output: Option<PathBuf>,
}

/// Count records per domain. Records without a domain are not counted
/// in `domains`.
pub fn summarize(records: &[Record]) -> DataSummary {
    let mut domains = BTreeMap::new();
    for record in records {
        if let Some(domain) = present_cell(record, columns::DOMAIN) {
            *domains.entry(domain.into_owned()).or_insert(0) += 1;
        }
    }

    DataSummary {
        total: records.len(),
        domains,
    }
}

/// Warn about identifiers and markers that will fall back to defaults.
///
/// Returns the number of warnings issued.
pub fn audit_records(records: &[Record]) -> usize {
    let mut warnings = 0;

    for (index, record) in records.iter().enumerate() {
        let position = index + 1;

        if let Some(id) = present_cell(record, columns::CONTROL_ID) {
            if !is_well_formed_identifier(&id) {
                warn!(position, id = %id, "identifier does not look like <PREFIX>-<NN>");
                warnings += 1;
            }
            if lookup_pillar(&id).is_none() {
                warn!(position, id = %id, "unrecognized identifier prefix, pillar falls back to default");
                warnings += 1;
            }
        }

        if let Some(marker) = present_cell(record, columns::VALIDATION_SCALE) {
            if lookup_risk(&marker).is_none() {
                warn!(position, marker = %marker, "unrecognized validation-scale marker, risk falls back to default");
                warnings += 1;
            }
        }
    }

    warnings
}

/// Write text to a file.
pub fn write_output(path: &Path, text: &str) -> PipelineResult<()> {
    std::fs::write(path, text).map_err(|source| PipelineError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Run the full pipeline: load, summarize, audit, build, write.
///
/// Nothing is written unless every record converts.
pub fn generate(options: &GenerateOptions) -> PipelineResult<GenerateResult> {
    if !options.input.exists() {
        return Err(PipelineError::MissingInput(options.input.clone()));
    }

    info!(input = %options.input.display(), table = %options.mapping.table, "loading controls");
    let parsed = load(&options.input, options.delimiter)?;
    info!(
        rows = parsed.records.len(),
        encoding = %parsed.encoding,
        delimiter = ?parsed.delimiter,
        "parsed source"
    );

    let summary = summarize(&parsed.records);
    info!(total = summary.total, domains = summary.domains.len(), "data summary");
    for (domain, count) in &summary.domains {
        info!("  {}: {} controls", domain, count);
    }

    let missing = options.mapping.missing_sources(&parsed.headers);
    if !missing.is_empty() {
        warn!(columns = ?missing, "mapping reads columns absent from the input");
    }

    if parsed.headers.iter().any(|h| h == columns::CONTROL_ID) {
        audit_records(&parsed.records);
    }

    let source = options
        .input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    let script = render_script(&parsed.records, &options.mapping, source.as_deref())?;

    if let Some(ref path) = options.output {
        write_output(path, &script)?;
        info!(
            output = %path.display(),
            lines = script.lines().count(),
            "SQL file generated"
        );
    }

    Ok(GenerateResult {
        script,
        row_count: parsed.records.len(),
        summary,
        output: options.output.clone(),
    })
}
