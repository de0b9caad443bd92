//! Derived operator reports built on the aggregator and detectors.

pub mod correlation;
pub mod cost;
pub mod dashboard;
pub mod glass;

pub use correlation::{parameter_correlation, CorrelationMatrix};
pub use cost::{cost_summary, recent_days_table, CostSummary, RecentDay};
pub use dashboard::{
    flow_changes, monthly_share_pivot, recent_window, top_n, FlowChanges, PivotRow, RankEntry,
    SharePivot,
};
pub use glass::{
    glass_count_per_chamber, glass_product_match, glass_recipe_match, layer_chamber_daily,
    rpsc_chamber_daily, rpsc_glass_count, ChamberGlassCount, GlassMatch, GroupDay, TimedMean,
};
