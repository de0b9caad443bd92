//! Config resolution.
//!
//! Sources, highest priority first:
//! 1. `--config <file>` on the command line
//! 2. `NF3_CONFIG` environment variable
//! 3. `$XDG_CONFIG_HOME/nf3/config.json` or `config.toml`
//! 4. a named preset
//! 5. built-in defaults
//!
//! A file and a preset are never merged: when both are present the file wins
//! and the preset is ignored with a warning. CLI overrides for unit and
//! granularity are applied by the caller after resolution.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analysis::AnalysisConfig;
use crate::error::ConfigError;
use crate::preset::{get_preset, PresetName};
use crate::validate::validate;

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "NF3_CONFIG";

const CONFIG_DIR_NAME: &str = "nf3";
const CONFIG_FILE_STEMS: [&str; 2] = ["config.json", "config.toml"];

/// Where the effective config came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigSource {
    File { path: PathBuf },
    Preset { name: String },
    Defaults,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::File { path } => write!(f, "file {}", path.display()),
            ConfigSource::Preset { name } => write!(f, "preset {}", name),
            ConfigSource::Defaults => f.write_str("built-in defaults"),
        }
    }
}

/// Candidate config file locations, in priority order.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    pub explicit: Option<PathBuf>,
    pub env: Option<PathBuf>,
    pub user_dir: Option<PathBuf>,
}

impl ConfigPaths {
    /// Collect locations from the CLI flag, environment and XDG config dir.
    pub fn discover(explicit: Option<&Path>) -> Self {
        Self {
            explicit: explicit.map(Path::to_path_buf),
            env: std::env::var_os(CONFIG_ENV_VAR)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            user_dir: dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME)),
        }
    }

    /// First existing config file, if any.
    ///
    /// Explicit and environment paths are returned even if missing so that a
    /// typo surfaces as an I/O error instead of silently falling through.
    pub fn find_file(&self) -> Option<PathBuf> {
        if let Some(p) = &self.explicit {
            return Some(p.clone());
        }
        if let Some(p) = &self.env {
            return Some(p.clone());
        }
        let dir = self.user_dir.as_ref()?;
        CONFIG_FILE_STEMS
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file())
    }
}

/// Effective config and its origin.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: AnalysisConfig,
    pub source: ConfigSource,
}

/// Read and parse one config file (JSON or TOML by extension).
pub fn load_config_file(path: &Path) -> Result<AnalysisConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let config: AnalysisConfig = match ext.as_deref() {
        Some("json") => serde_json::from_str(&content)?,
        Some("toml") => toml::from_str(&content)?,
        _ => return Err(ConfigError::UnsupportedExtension(path.to_path_buf())),
    };
    if !nf3_common::schema::is_compatible(&config.schema_version) {
        return Err(ConfigError::IncompatibleSchema(config.schema_version));
    }
    debug!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Resolve the effective config and validate it.
pub fn resolve_config(
    paths: &ConfigPaths,
    preset: Option<PresetName>,
) -> Result<ResolvedConfig, ConfigError> {
    let resolved = match paths.find_file() {
        Some(path) => {
            if let Some(p) = preset {
                warn!(
                    preset = p.as_str(),
                    path = %path.display(),
                    "config file takes precedence; preset ignored"
                );
            }
            ResolvedConfig {
                config: load_config_file(&path)?,
                source: ConfigSource::File { path },
            }
        }
        None => match preset {
            Some(p) => ResolvedConfig {
                config: get_preset(p),
                source: ConfigSource::Preset {
                    name: p.as_str().to_string(),
                },
            },
            None => ResolvedConfig {
                config: AnalysisConfig::default(),
                source: ConfigSource::Defaults,
            },
        },
    };
    validate(&resolved.config).into_result()?;
    debug!(source = %resolved.source, "config resolved");
    Ok(resolved)
}
