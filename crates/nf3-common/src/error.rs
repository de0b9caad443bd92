//! Error types for NF3 flow analytics.

use thiserror::Error;

/// Result type alias for NF3 flow analytics operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for NF3 flow analytics.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid configuration: {}", .problems.join("; "))]
    InvalidConfig { problems: Vec<String> },

    #[error("unknown preset: {name}")]
    UnknownPreset { name: String },

    #[error("unsupported schema version: {version} (current {current})")]
    SchemaIncompatible { version: String, current: String },

    // Input errors (20-29)
    #[error("required column '{column}' is missing from the input")]
    MissingColumn { column: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("input contains no data rows")]
    EmptyInput,

    // Analysis errors (30-39)
    #[error("analysis failed: {0}")]
    Analysis(String),

    #[error("no data for {what}")]
    NoData { what: String },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    /// Used for detailed error reporting in JSON output.
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidConfig { .. } => 11,
            Error::UnknownPreset { .. } => 12,
            Error::SchemaIncompatible { .. } => 13,
            Error::MissingColumn { .. } => 20,
            Error::InvalidInput(_) => 21,
            Error::EmptyInput => 22,
            Error::Analysis(_) => 30,
            Error::NoData { .. } => 31,
            Error::Io(_) => 60,
            Error::Csv(_) => 61,
            Error::Json(_) => 62,
        }
    }

    /// True for errors caused by the configuration rather than the data.
    pub fn is_config(&self) -> bool {
        (10..20).contains(&self.code())
    }

    /// True for errors caused by the shape or content of the input table.
    pub fn is_input(&self) -> bool {
        (20..30).contains(&self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_names_the_column() {
        let err = Error::MissingColumn {
            column: "TSTAMP".to_string(),
        };
        assert!(err.to_string().contains("TSTAMP"));
        assert_eq!(err.code(), 20);
        assert!(err.is_input());
        assert!(!err.is_config());
    }

    #[test]
    fn invalid_config_lists_every_problem() {
        let err = Error::InvalidConfig {
            problems: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(err.to_string(), "invalid configuration: a; b");
        assert!(err.is_config());
    }
}
