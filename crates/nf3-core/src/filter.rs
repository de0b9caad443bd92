//! Record filtering by per-dimension accepted values.

use nf3_common::Dimension;
use nf3_config::{AnalysisConfig, DimensionFilter};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::record::FlowRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSummary {
    pub kept: usize,
    pub dropped: usize,
}

/// True when `record` passes every filter (AND across dimensions).
pub fn matches(record: &FlowRecord, filters: &BTreeMap<Dimension, DimensionFilter>) -> bool {
    filters
        .iter()
        .all(|(dim, filter)| filter.allows(record.value(*dim)))
}

/// Keep only the records accepted by the config's filters.
pub fn filter_records(
    records: Vec<FlowRecord>,
    config: &AnalysisConfig,
) -> (Vec<FlowRecord>, FilterSummary) {
    let before = records.len();
    let kept: Vec<FlowRecord> = records
        .into_iter()
        .filter(|r| matches(r, &config.filters))
        .collect();
    let summary = FilterSummary {
        kept: kept.len(),
        dropped: before - kept.len(),
    };
    debug!(kept = summary.kept, dropped = summary.dropped, "applied filters");
    (kept, summary)
}
