//! Daily cost, emissions and the recent-days table.

use chrono::NaiveDate;
use nf3_common::FlowUnit;
use nf3_config::CostSettings;
use serde::Serialize;

use crate::aggregate::FlowSeries;
use crate::convert::{convert, cost, emissions_co2e};

/// Totals over a daily SCCM series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostSummary {
    pub days: usize,
    pub total_kg: f64,
    pub price_per_kg: f64,
    pub total_cost: f64,
    pub gwp: f64,
    pub total_co2e_kg: f64,
}

/// Cost and CO2e of a daily SCCM series, mass taken as kg/s-converted flow.
pub fn cost_summary(daily_sccm: &[f64], settings: &CostSettings) -> CostSummary {
    let total_kg: f64 = daily_sccm
        .iter()
        .map(|v| convert(*v, FlowUnit::KgPerSecond))
        .sum();
    CostSummary {
        days: daily_sccm.len(),
        total_kg,
        price_per_kg: settings.price_per_kg,
        total_cost: cost(total_kg, settings.price_per_kg),
        gwp: settings.gwp,
        total_co2e_kg: emissions_co2e(total_kg, settings.gwp),
    }
}

/// One day of the recent-days table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentDay {
    pub date: NaiveDate,
    pub kg_per_second: f64,
    pub liters_per_second: f64,
    pub sccm: f64,
    /// Month-reset cumulative flow in the report unit.
    pub cumulative: f64,
    /// Among the five largest days of the table.
    pub top: bool,
}

const TOP_DAYS: usize = 5;

/// Last `days` points of a daily SCCM series, newest first.
pub fn recent_days_table(daily_sccm: &FlowSeries, unit: FlowUnit, days: usize) -> Vec<RecentDay> {
    let start = daily_sccm.points.len().saturating_sub(days);
    let window = &daily_sccm.points[start..];

    let mut order: Vec<usize> = (0..window.len()).collect();
    order.sort_by(|&a, &b| window[b].value.total_cmp(&window[a].value).then(a.cmp(&b)));
    let mut top = vec![false; window.len()];
    for &i in order.iter().take(TOP_DAYS) {
        top[i] = true;
    }

    window
        .iter()
        .zip(top)
        .rev()
        .map(|(p, top)| RecentDay {
            date: p.bucket.start,
            kg_per_second: convert(p.value, FlowUnit::KgPerSecond),
            liters_per_second: convert(p.value, FlowUnit::LitersPerSecond),
            sccm: p.value,
            cumulative: convert(p.cumulative_month, unit),
            top,
        })
        .collect()
}
