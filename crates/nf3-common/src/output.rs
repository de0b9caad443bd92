//! Output format specifications.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a report is rendered on stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Pretty-printed JSON document (default, machine readable).
    #[default]
    Json,
    /// Flat CSV rows for tabular reports.
    Csv,
    /// Short human-readable text.
    Summary,
}

impl OutputFormat {
    /// Whether the format can carry nested structures such as trees.
    pub fn supports_nesting(self) -> bool {
        matches!(self, OutputFormat::Json)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Summary => write!(f, "summary"),
        }
    }
}
