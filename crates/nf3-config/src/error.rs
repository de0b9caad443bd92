//! Errors raised while loading or resolving configuration.

use std::path::PathBuf;

use crate::validate::ValidationResult;

/// Errors that can occur during configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unsupported config file extension for {0} (expected .json or .toml)")]
    UnsupportedExtension(PathBuf),

    #[error("unsupported config schema version: {0}")]
    IncompatibleSchema(String),

    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    #[error("config validation failed: {0}")]
    Invalid(ValidationResult),
}

impl From<ConfigError> for nf3_common::Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io { source, .. } => nf3_common::Error::Io(source),
            ConfigError::Json(e) => nf3_common::Error::Config(format!("JSON parse error: {e}")),
            ConfigError::Toml(e) => nf3_common::Error::Config(format!("TOML parse error: {e}")),
            ConfigError::IncompatibleSchema(version) => nf3_common::Error::SchemaIncompatible {
                version,
                current: crate::CONFIG_SCHEMA_VERSION.to_string(),
            },
            ConfigError::UnknownPreset(name) => nf3_common::Error::UnknownPreset { name },
            ConfigError::Invalid(result) => nf3_common::Error::InvalidConfig {
                problems: result.errors.iter().map(|e| e.to_string()).collect(),
            },
            other @ ConfigError::UnsupportedExtension(_) => {
                nf3_common::Error::Config(other.to_string())
            }
        }
    }
}
