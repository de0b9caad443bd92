//! Categorical dimensions of a flow record.
//!
//! Every dimension except [`Dimension::Layer`] maps to one column of the
//! input extract; the layer is derived from the recipe id.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Label used for records whose value for a dimension is missing.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// A categorical column usable for filtering, grouping, and hierarchies.
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
pub enum Dimension {
    Chamber,
    Tool,
    Recipe,
    Operation,
    Product,
    ChamberCode,
    Sin,
    Glass,
    StepName,
    Layer,
}

impl Dimension {
    pub const ALL: [Dimension; 10] = [
        Dimension::Chamber,
        Dimension::Tool,
        Dimension::Recipe,
        Dimension::Operation,
        Dimension::Product,
        Dimension::ChamberCode,
        Dimension::Sin,
        Dimension::Glass,
        Dimension::StepName,
        Dimension::Layer,
    ];

    /// Column header in the input extract (or the derived column name).
    pub fn column(self) -> &'static str {
        match self {
            Dimension::Chamber => "CHAMBERID",
            Dimension::Tool => "TOOLID",
            Dimension::Recipe => "RECIPEID",
            Dimension::Operation => "OPERATION",
            Dimension::Product => "PRODUCT",
            Dimension::ChamberCode => "CHAMBER_CODE",
            Dimension::Sin => "SIN",
            Dimension::Glass => "GLASSID",
            Dimension::StepName => "step_name",
            Dimension::Layer => "LAYER",
        }
    }

    /// Whether the value comes from a derivation rather than an input column.
    pub fn is_derived(self) -> bool {
        matches!(self, Dimension::Layer)
    }

    fn key(self) -> &'static str {
        match self {
            Dimension::Chamber => "chamber",
            Dimension::Tool => "tool",
            Dimension::Recipe => "recipe",
            Dimension::Operation => "operation",
            Dimension::Product => "product",
            Dimension::ChamberCode => "chamber_code",
            Dimension::Sin => "sin",
            Dimension::Glass => "glass",
            Dimension::StepName => "step_name",
            Dimension::Layer => "layer",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Dimension {
    type Err = String;

    /// Accepts the snake_case key (`chamber_code`) or the column header
    /// (`CHAMBER_CODE`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Dimension::ALL
            .into_iter()
            .find(|d| d.key().eq_ignore_ascii_case(needle) || d.column().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("unknown dimension '{}'", needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keys_and_columns() {
        assert_eq!("chamber".parse::<Dimension>().unwrap(), Dimension::Chamber);
        assert_eq!("CHAMBERID".parse::<Dimension>().unwrap(), Dimension::Chamber);
        assert_eq!("Step_Name".parse::<Dimension>().unwrap(), Dimension::StepName);
        assert_eq!("LAYER".parse::<Dimension>().unwrap(), Dimension::Layer);
        assert!("pressure".parse::<Dimension>().is_err());
    }

    #[test]
    fn only_layer_is_derived() {
        let derived: Vec<_> = Dimension::ALL.iter().filter(|d| d.is_derived()).collect();
        assert_eq!(derived, vec![&Dimension::Layer]);
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Dimension::ChamberCode).unwrap();
        assert_eq!(json, "\"chamber_code\"");
    }
}
