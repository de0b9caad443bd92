//! Flow units and time granularities selectable by configuration.
//!
//! These enums only *name* a choice. The conversion constants belong to the
//! unit converter in `nf3-core`, so callers cannot alter them.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target unit for converted NF3 flow.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum FlowUnit {
    /// Kilograms per second.
    #[value(name = "kg/s", alias = "kg_per_second")]
    KgPerSecond,
    /// Kilograms per day.
    #[value(name = "kg/day", alias = "kg_per_day")]
    KgPerDay,
    /// Liters per second.
    #[value(name = "l/s", alias = "liters_per_second")]
    LitersPerSecond,
    /// Standard cubic centimeters per minute (no conversion).
    #[value(name = "sccm")]
    Sccm,
}

impl FlowUnit {
    pub const ALL: [FlowUnit; 4] = [
        FlowUnit::KgPerSecond,
        FlowUnit::KgPerDay,
        FlowUnit::LitersPerSecond,
        FlowUnit::Sccm,
    ];

    /// Short label used in report headers, e.g. `kg/s`.
    pub fn label(self) -> &'static str {
        match self {
            FlowUnit::KgPerSecond => "kg/s",
            FlowUnit::KgPerDay => "kg/day",
            FlowUnit::LitersPerSecond => "l/s",
            FlowUnit::Sccm => "sccm",
        }
    }

    /// Whether values in this unit are masses (usable for cost/emissions).
    pub fn is_mass(self) -> bool {
        matches!(self, FlowUnit::KgPerSecond | FlowUnit::KgPerDay)
    }
}

impl Default for FlowUnit {
    fn default() -> Self {
        FlowUnit::KgPerSecond
    }
}

impl fmt::Display for FlowUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FlowUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kg/s" | "kg_per_second" => Ok(FlowUnit::KgPerSecond),
            "kg/day" | "kg_per_day" => Ok(FlowUnit::KgPerDay),
            "l/s" | "liters_per_second" => Ok(FlowUnit::LitersPerSecond),
            "sccm" => Ok(FlowUnit::Sccm),
            other => Err(format!("unknown flow unit '{}'", other)),
        }
    }
}

/// Calendar bucket size for time-based aggregation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    JsonSchema,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Year,
    Quarter,
    Month,
    Week,
    Day,
}

impl Default for Granularity {
    fn default() -> Self {
        Granularity::Day
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Year => write!(f, "year"),
            Granularity::Quarter => write!(f, "quarter"),
            Granularity::Month => write!(f, "month"),
            Granularity::Week => write!(f, "week"),
            Granularity::Day => write!(f, "day"),
        }
    }
}
