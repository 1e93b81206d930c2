//! Transformation module.
//!
//! - Mapping: target table and per-column derivation rules
//! - Insert: batch INSERT statement and import script rendering
//! - Pipeline: CSV file to SQL file

pub mod insert;
pub mod mapping;
pub mod pipeline;

pub use insert::{build_insert, build_values, render_script};
pub use mapping::{
    ai_controls_mapping, governance_controls_mapping, regulatory_references, ColumnMapping,
    ColumnRule, ImportMapping,
};
pub use pipeline::{generate, summarize, DataSummary, GenerateOptions, GenerateResult};
