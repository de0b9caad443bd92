//! Named configuration presets.
//!
//! Each preset reproduces the settings of one operator view so a run can be
//! started without writing a config file.

use nf3_common::{Dimension, FlowUnit, Granularity};
use serde::Serialize;

use crate::analysis::{AnalysisConfig, Baseline, DimensionFilter};
use crate::error::ConfigError;

/// Available presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PresetName {
    /// kg/s daily series with 7/30-day averages over the cleaning steps.
    Basics,
    /// kg/day monitoring view with the 5-day abnormal rule, all steps.
    Dashboard,
    /// SCCM category ratios with negative values flagged as outliers.
    Ratios,
    /// Defaults without the cleaning-step filter.
    AllSteps,
}

impl PresetName {
    pub const ALL: [PresetName; 4] = [
        PresetName::Basics,
        PresetName::Dashboard,
        PresetName::Ratios,
        PresetName::AllSteps,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PresetName::Basics => "basics",
            PresetName::Dashboard => "dashboard",
            PresetName::Ratios => "ratios",
            PresetName::AllSteps => "all-steps",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PresetName::Basics => "Daily kg/s flow, 7/30-day moving averages, cleaning steps only",
            PresetName::Dashboard => "Daily kg/day monitoring with the 5x five-day abnormal rule",
            PresetName::Ratios => "Daily SCCM category ratios, outlier and negative cells dropped",
            PresetName::AllSteps => "Default settings over every process step",
        }
    }
}

impl std::str::FromStr for PresetName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetName::ALL
            .into_iter()
            .find(|p| p.as_str() == s.trim())
            .ok_or_else(|| ConfigError::UnknownPreset(s.to_string()))
    }
}

/// Listing entry for `config presets`.
#[derive(Debug, Clone, Serialize)]
pub struct PresetInfo {
    pub name: &'static str,
    pub description: &'static str,
}

pub fn list_presets() -> Vec<PresetInfo> {
    PresetName::ALL
        .iter()
        .map(|p| PresetInfo {
            name: p.as_str(),
            description: p.description(),
        })
        .collect()
}

/// Build the config for a preset.
pub fn get_preset(name: PresetName) -> AnalysisConfig {
    let mut cfg = AnalysisConfig::default();
    match name {
        PresetName::Basics => {
            cfg.description = Some(name.description().to_string());
        }
        PresetName::Dashboard => {
            cfg.description = Some(name.description().to_string());
            cfg.unit = FlowUnit::KgPerDay;
            cfg.rolling_windows = vec![5];
            cfg.abnormal.window = 5;
            cfg.abnormal.multiplier = 5.0;
            cfg.abnormal.baseline = Baseline::Preceding;
            cfg.outliers.exclude_from_totals = false;
            cfg.set_filter(Dimension::StepName, DimensionFilter::All);
        }
        PresetName::Ratios => {
            cfg.description = Some(name.description().to_string());
            cfg.unit = FlowUnit::Sccm;
            cfg.granularity = Granularity::Day;
            cfg.outliers.flag_negative = true;
            cfg.outliers.exclude_from_shares = true;
            cfg.set_filter(Dimension::StepName, DimensionFilter::All);
        }
        PresetName::AllSteps => {
            cfg.description = Some(name.description().to_string());
            cfg.set_filter(Dimension::StepName, DimensionFilter::All);
        }
    }
    cfg
}
