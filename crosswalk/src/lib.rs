//! # Crosswalk - SQL imports for AI-governance control data
//!
//! Crosswalk reads the EU AI Act / AICM control crosswalk (exported as CSV)
//! and writes a single batch `INSERT` statement for a target table.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│   Mapping   │────▶│  SQL Script │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │ (per column)│     │ (one batch) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use crosswalk::{generate, GenerateOptions, TableKind};
//!
//! fn main() -> Result<(), crosswalk::PipelineError> {
//!     let options = GenerateOptions::new("EU_AI_AICM_Crosswalk_v6.csv", TableKind::AiControls.mapping())
//!         .with_output("import_ai_controls.sql");
//!     let result = generate(&options)?;
//!     println!("Imported {} controls", result.row_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per layer
//! - [`models`] - Records and the typed control view
//! - [`parser`] - CSV loading with auto-detection
//! - [`sql`] - Literal escaping
//! - [`classify`] - Risk level and pillar lookups
//! - [`transform`] - Mappings, INSERT building and pipeline
//! - [`config`] - Environment settings

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// SQL rendering
pub mod sql;

// Classification
pub mod classify;

// Transformation
pub mod transform;

// Configuration
pub mod config;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ConfigError, CsvError, MappingError, PipelineError, TransformError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{columns, controls_from_records, ControlRecord, Record};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{detect_delimiter, detect_encoding, load, parse_bytes, ParseResult};

// =============================================================================
// Re-exports - SQL and classification
// =============================================================================

pub use sql::{escape_scalar, format_array_literal, split_list_field, SqlLiteral};

pub use classify::{classify_pillar, classify_risk, DEFAULT_PILLAR, DEFAULT_RISK_LEVEL};

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::{
    build_insert, build_values, generate, render_script, summarize, ColumnMapping, ColumnRule,
    DataSummary, GenerateOptions, GenerateResult, ImportMapping,
};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{Settings, TableKind};
