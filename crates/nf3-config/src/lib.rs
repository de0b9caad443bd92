//! NF3 flow analytics configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for the analysis configuration (unit, granularity,
//!   filters, hierarchy, rolling windows, outlier rules, cost settings)
//! - Config resolution (CLI → env → XDG → preset → defaults)
//! - Semantic validation that reports every problem at once
//! - Config snapshots (hash + source) embedded in reports
//! - Configuration presets mirroring the operator dashboards

pub mod analysis;
pub mod error;
pub mod preset;
pub mod resolve;
pub mod snapshot;
pub mod validate;

pub use analysis::{
    AbnormalSettings, AnalysisConfig, Baseline, CorrelationSettings, CostSettings,
    DimensionFilter, OutlierSettings,
};
pub use error::ConfigError;
pub use preset::{get_preset, list_presets, PresetInfo, PresetName};
pub use resolve::{load_config_file, resolve_config, ConfigPaths, ConfigSource, ResolvedConfig};
pub use snapshot::ConfigSnapshot;
pub use validate::{validate, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = nf3_common::SCHEMA_VERSION;
