//! Analysis configuration types.
//!
//! Every field has a default, so a config file only needs the keys it wants
//! to change. Unit and granularity select behaviour; they never carry the
//! conversion constants themselves.

use std::collections::{BTreeMap, BTreeSet};

use nf3_common::dimension::UNKNOWN_CATEGORY;
use nf3_common::{Dimension, FlowUnit, Granularity};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Step names of the chamber cleaning sequence, the dashboards' default scope.
pub const CLEANING_STEPS: [&str; 3] = ["CLN1", "CLN2", "CLN3"];

/// Complete analysis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AnalysisConfig {
    pub schema_version: String,

    pub description: Option<String>,

    /// Unit for every converted flow value in reports.
    pub unit: FlowUnit,

    /// Bucket size for time series.
    pub granularity: Granularity,

    /// Per-dimension accepted values. Dimensions not listed accept everything.
    pub filters: BTreeMap<Dimension, DimensionFilter>,

    /// Ordered levels of the hierarchical breakdown.
    pub hierarchy: Vec<Dimension>,

    /// Trailing window sizes (in buckets) for rolling averages.
    pub rolling_windows: Vec<usize>,

    pub outliers: OutlierSettings,

    pub abnormal: AbnormalSettings,

    pub cost: CostSettings,

    /// Length of the "recent" window, counted back from the latest timestamp.
    pub recent_days: u32,

    /// Number of entries kept in rankings.
    pub top_n: usize,

    pub correlation: CorrelationSettings,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let mut filters = BTreeMap::new();
        filters.insert(
            Dimension::StepName,
            DimensionFilter::one_of(CLEANING_STEPS),
        );
        Self {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            description: None,
            unit: FlowUnit::KgPerSecond,
            granularity: Granularity::Day,
            filters,
            hierarchy: vec![
                Dimension::Layer,
                Dimension::Operation,
                Dimension::Sin,
                Dimension::Chamber,
            ],
            rolling_windows: vec![7, 30],
            outliers: OutlierSettings::default(),
            abnormal: AbnormalSettings::default(),
            cost: CostSettings::default(),
            recent_days: 30,
            top_n: 10,
            correlation: CorrelationSettings::default(),
        }
    }
}

impl AnalysisConfig {
    /// Filter for a dimension; unlisted dimensions accept everything.
    pub fn filter_for(&self, dimension: Dimension) -> &DimensionFilter {
        static ALL: DimensionFilter = DimensionFilter::All;
        self.filters.get(&dimension).unwrap_or(&ALL)
    }

    /// Replace (or clear, with [`DimensionFilter::All`]) one dimension's filter.
    pub fn set_filter(&mut self, dimension: Dimension, filter: DimensionFilter) {
        match filter {
            DimensionFilter::All => {
                self.filters.remove(&dimension);
            }
            other => {
                self.filters.insert(dimension, other);
            }
        }
    }
}

/// Accepted values for one categorical dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DimensionFilter {
    /// Every value, including missing ones.
    All,
    /// Only the listed values. A missing value matches only if the set
    /// contains the `unknown` label.
    OneOf(BTreeSet<String>),
}

impl DimensionFilter {
    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DimensionFilter::OneOf(values.into_iter().map(Into::into).collect())
    }

    /// Whether a record with this value passes the filter.
    pub fn allows(&self, value: Option<&str>) -> bool {
        match self {
            DimensionFilter::All => true,
            DimensionFilter::OneOf(set) => match value {
                Some(v) => set.contains(v),
                None => set.contains(UNKNOWN_CATEGORY),
            },
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, DimensionFilter::All)
    }
}

/// Interquartile-range outlier rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutlierSettings {
    /// Fence multiplier `k` in `Q1 - k·IQR`, `Q3 + k·IQR`.
    pub iqr_multiplier: f64,
    /// Also flag negative values (the ratio-series variant).
    pub flag_negative: bool,
    /// Drop IQR outliers from the daily series before cumulative sums and
    /// cost/emission totals.
    pub exclude_from_totals: bool,
    /// Drop IQR-flagged (bucket, category) cells from share reports.
    pub exclude_from_shares: bool,
}

impl Default for OutlierSettings {
    fn default() -> Self {
        Self {
            iqr_multiplier: 1.5,
            flag_negative: false,
            exclude_from_totals: true,
            exclude_from_shares: false,
        }
    }
}

/// What the abnormal-flow rule compares a bucket against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Baseline {
    /// Mean of the preceding `window` buckets, excluding the bucket itself.
    Preceding,
    /// Trailing mean including the bucket itself.
    Inclusive,
}

/// Rolling-average ratio rule ("N times the recent average").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AbnormalSettings {
    pub window: usize,
    pub multiplier: f64,
    pub baseline: Baseline,
}

impl Default for AbnormalSettings {
    fn default() -> Self {
        Self {
            window: 5,
            multiplier: 5.0,
            baseline: Baseline::Preceding,
        }
    }
}

/// Cost and emission factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CostSettings {
    /// Currency units per kilogram of NF3.
    pub price_per_kg: f64,
    /// Global warming potential (kg CO2e per kg).
    pub gwp: f64,
}

impl Default for CostSettings {
    fn default() -> Self {
        Self {
            price_per_kg: 50.0,
            gwp: 17_200.0,
        }
    }
}

/// Parameter correlation analysis scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CorrelationSettings {
    /// Step whose records are correlated.
    pub step: String,
    /// Candidate parameter columns; those absent from the input are skipped.
    pub parameters: Vec<String>,
}

impl Default for CorrelationSettings {
    fn default() -> Self {
        Self {
            step: "CLN1".to_string(),
            parameters: [
                "ΔTime", "pressure", "load_pwr", "rfl_pwr", "mon_vpp", "vdc", "N2_Flow",
                "NH3_Flow", "SiH4_Flow", "H2_Flow", "PH3_Flow", "Ar_Flow", "NF3_Flow",
                "N2O_Flow",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scopes_to_cleaning_steps() {
        let cfg = AnalysisConfig::default();
        let steps = cfg.filter_for(Dimension::StepName);
        assert!(steps.allows(Some("CLN2")));
        assert!(!steps.allows(Some("DEP1")));
        assert!(cfg.filter_for(Dimension::Chamber).is_all());
    }

    #[test]
    fn missing_value_only_matches_unknown() {
        let f = DimensionFilter::one_of(["BP"]);
        assert!(!f.allows(None));
        let f = DimensionFilter::one_of(["BP", UNKNOWN_CATEGORY]);
        assert!(f.allows(None));
        assert!(DimensionFilter::All.allows(None));
    }

    #[test]
    fn set_filter_all_removes_entry() {
        let mut cfg = AnalysisConfig::default();
        cfg.set_filter(Dimension::StepName, DimensionFilter::All);
        assert!(cfg.filters.is_empty());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: AnalysisConfig =
            serde_json::from_str(r#"{"unit": "kg_per_day", "rolling_windows": [5]}"#).unwrap();
        assert_eq!(cfg.unit, FlowUnit::KgPerDay);
        assert_eq!(cfg.rolling_windows, vec![5]);
        assert_eq!(cfg.top_n, 10);
        assert_eq!(cfg.abnormal.window, 5);
    }

    #[test]
    fn filters_serialize_as_map() {
        let mut cfg = AnalysisConfig::default();
        cfg.set_filter(Dimension::Layer, DimensionFilter::one_of(["AS"]));
        let json = serde_json::to_value(&cfg).unwrap();
        assert_eq!(json["filters"]["layer"]["one_of"][0], "AS");
        assert_eq!(json["filters"]["step_name"]["one_of"][0], "CLN1");
    }
}
