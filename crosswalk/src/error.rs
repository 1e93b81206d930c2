//! Error types for the Crosswalk import generator.
//!
//! One enum per layer:
//!
//! - [`CsvError`] - reading and decoding the source file
//! - [`TransformError`] - turning records into SQL
//! - [`MappingError`] - loading or validating an import mapping
//! - [`ConfigError`] - settings from flags and environment
//! - [`PipelineError`] - top-level orchestration
//!
//! Conversions are `From` based so `?` works across layers.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors while reading the tabular source.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid CSV content at a given line.
    #[error("Line {line}: {message}")]
    ParseError { line: u64, message: String },

    /// Delimiter that cannot be used as a single-byte CSV separator.
    #[error("Unsupported delimiter: {0:?}")]
    InvalidDelimiter(char),

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,
}

// =============================================================================
// Transformation Errors
// =============================================================================

/// Errors while building SQL from records.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Nothing to insert.
    #[error("No records to insert into '{0}'")]
    EmptyBatch(String),

    /// A record lacks a column the target schema requires.
    #[error("Record #{position} ({record}) is missing mandatory field '{field}'")]
    MissingField {
        /// 1-based position among data records. Blank rows are not counted,
        /// so this is not a line number of the source file.
        position: usize,
        /// Control identifier, or `<no id>` when the identifier itself is missing.
        record: String,
        /// Source column name.
        field: String,
    },
}

// =============================================================================
// Mapping Errors
// =============================================================================

/// Errors loading an import mapping.
#[derive(Debug, Error)]
pub enum MappingError {
    /// Structurally unusable mapping.
    #[error("Invalid mapping: {0}")]
    Invalid(String),

    /// Mapping file could not be read.
    #[error("Mapping IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Mapping JSON is malformed.
    #[error("Mapping JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors resolving settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Unknown target table name.
    #[error("Unknown table '{0}' (expected ai-controls or governance-controls)")]
    UnknownTable(String),

    /// Environment variable present but unusable.
    #[error("Invalid value for {name}: {message}")]
    InvalidVar { name: String, message: String },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level errors returned by [`crate::transform::pipeline::generate`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Source file absent. Nothing is written.
    #[error("Input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Transformation error.
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Mapping error.
    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Failed to write output.
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for transformation operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for mapping operations.
pub type MappingResult<T> = Result<T, MappingError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
