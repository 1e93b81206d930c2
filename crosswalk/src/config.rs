//! Settings from environment variables.
//!
//! `.env` is loaded by the binary; command-line flags override anything
//! resolved here.
//!
//! | Variable             | Default                        |
//! |----------------------|--------------------------------|
//! | `CROSSWALK_INPUT`    | `EU_AI_AICM_Crosswalk_v6.csv`  |
//! | `CROSSWALK_OUTPUT`   | per table, see [`TableKind`]   |
//! | `CROSSWALK_TABLE`    | `ai-controls`                  |
//! | `CROSSWALK_MAPPING`  | none (built-in mapping)        |

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::transform::mapping::{ai_controls_mapping, governance_controls_mapping, ImportMapping};

/// Default crosswalk export read when no input is given.
pub const DEFAULT_INPUT: &str = "EU_AI_AICM_Crosswalk_v6.csv";

pub const ENV_INPUT: &str = "CROSSWALK_INPUT";
pub const ENV_OUTPUT: &str = "CROSSWALK_OUTPUT";
pub const ENV_TABLE: &str = "CROSSWALK_TABLE";
pub const ENV_MAPPING: &str = "CROSSWALK_MAPPING";

/// Built-in import targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableKind {
    /// One-to-one copy of every crosswalk column.
    #[default]
    AiControls,
    /// Derived governance rows with pillar, risk level and sort order.
    GovernanceControls,
}

impl TableKind {
    pub fn mapping(self) -> ImportMapping {
        match self {
            TableKind::AiControls => ai_controls_mapping(),
            TableKind::GovernanceControls => governance_controls_mapping(),
        }
    }

    /// Output file written when none is configured.
    pub fn default_output(self) -> &'static str {
        match self {
            TableKind::AiControls => "import_ai_controls.sql",
            TableKind::GovernanceControls => "import_controls.sql",
        }
    }
}

impl FromStr for TableKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "ai-controls" | "ai" => Ok(TableKind::AiControls),
            "governance-controls" | "governance" => Ok(TableKind::GovernanceControls),
            _ => Err(ConfigError::UnknownTable(s.to_string())),
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::AiControls => f.write_str("ai-controls"),
            TableKind::GovernanceControls => f.write_str("governance-controls"),
        }
    }
}

/// Resolved generation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub input: PathBuf,
    /// `None` means the table's default output file.
    pub output: Option<PathBuf>,
    pub table: TableKind,
    /// Custom mapping file replacing the table's built-in mapping.
    pub mapping: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: None,
            table: TableKind::default(),
            mapping: None,
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`, ignoring empty values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut settings = Settings::default();

        if let Some(input) = get(ENV_INPUT) {
            settings.input = PathBuf::from(input);
        }
        settings.output = get(ENV_OUTPUT).map(PathBuf::from);
        if let Some(table) = get(ENV_TABLE) {
            settings.table = table.parse().map_err(|e: ConfigError| ConfigError::InvalidVar {
                name: ENV_TABLE.to_string(),
                message: e.to_string(),
            })?;
        }
        settings.mapping = get(ENV_MAPPING).map(PathBuf::from);

        Ok(settings)
    }

    /// Output path, falling back to the table default.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.table.default_output()))
    }

    /// Custom mapping if configured, otherwise the table's built-in one.
    pub fn import_mapping(&self) -> Result<ImportMapping, crate::error::MappingError> {
        match &self.mapping {
            Some(path) => ImportMapping::from_file(path),
            None => Ok(self.table.mapping()),
        }
    }
}
