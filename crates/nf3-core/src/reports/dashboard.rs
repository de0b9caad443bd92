//! Monitoring-view reports: flow changes, rankings, monthly shares.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate};
use nf3_common::{Dimension, Error, FlowUnit, Granularity, Result};
use nf3_math::{change_rate, percentage};
use serde::Serialize;

use crate::aggregate::bucket_totals;
use crate::record::FlowRecord;
use crate::timestamp::month_key;

/// Day-over-day and month-over-month movement for one date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowChanges {
    pub date: NaiveDate,
    pub unit: FlowUnit,
    pub day_total: f64,
    /// Total of the previous day present in the data (not necessarily the
    /// previous calendar day).
    pub previous_day_total: Option<f64>,
    pub day_change_rate: Option<f64>,
    pub month: String,
    pub month_total: f64,
    pub previous_month_total: Option<f64>,
    pub month_change_rate: Option<f64>,
}

pub fn flow_changes<'a, I>(records: I, date: NaiveDate, unit: FlowUnit) -> Result<FlowChanges>
where
    I: IntoIterator<Item = &'a FlowRecord>,
{
    let daily = bucket_totals(records, Granularity::Day, unit);
    let idx = daily
        .rows
        .iter()
        .position(|r| r.bucket.start == date)
        .ok_or_else(|| Error::NoData {
            what: format!("date {}", date),
        })?;
    let day_total = daily.rows[idx].total;
    let previous_day_total = idx.checked_sub(1).map(|p| daily.rows[p].total);

    let mut months: BTreeMap<String, f64> = BTreeMap::new();
    for row in &daily.rows {
        *months.entry(month_key(row.bucket.start)).or_default() += row.total;
    }
    let month = month_key(date);
    let month_total = months.get(&month).copied().unwrap_or(0.0);
    let previous_month_total = months.range(..month.clone()).next_back().map(|(_, v)| *v);

    Ok(FlowChanges {
        date,
        unit,
        day_total,
        previous_day_total,
        day_change_rate: change_rate(previous_day_total, day_total),
        month,
        month_total,
        previous_month_total,
        month_change_rate: change_rate(previous_month_total, month_total),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankEntry {
    pub rank: usize,
    pub category: String,
    pub total: f64,
}

/// The `n` categories with the largest flow, descending; ties by name.
pub fn top_n<'a, I>(records: I, dimension: Dimension, unit: FlowUnit, n: usize) -> Vec<RankEntry>
where
    I: IntoIterator<Item = &'a FlowRecord>,
{
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for r in records {
        *totals.entry(r.category(dimension)).or_default() += r.flow(unit);
    }
    let mut entries: Vec<(&str, f64)> = totals.into_iter().collect();
    entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    entries
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(i, (category, total))| RankEntry {
            rank: i + 1,
            category: category.to_string(),
            total,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotRow {
    pub category: String,
    /// Percent share per month, aligned with [`SharePivot::months`]; 0 where
    /// the category has no flow that month.
    pub shares: Vec<f64>,
}

/// Category × month share table with month totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SharePivot {
    pub dimension: Dimension,
    pub unit: FlowUnit,
    pub months: Vec<String>,
    pub month_totals: Vec<f64>,
    pub rows: Vec<PivotRow>,
}

pub fn monthly_share_pivot<'a, I>(records: I, dimension: Dimension, unit: FlowUnit) -> SharePivot
where
    I: IntoIterator<Item = &'a FlowRecord>,
{
    let mut cells: BTreeMap<(String, String), f64> = BTreeMap::new();
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    let mut categories: BTreeSet<String> = BTreeSet::new();
    for r in records {
        let Some(date) = r.date() else { continue };
        let month = month_key(date);
        let category = r.category(dimension).to_string();
        let v = r.flow(unit);
        *totals.entry(month.clone()).or_default() += v;
        *cells.entry((category.clone(), month)).or_default() += v;
        categories.insert(category);
    }
    let months: Vec<String> = totals.keys().cloned().collect();
    let rows = categories
        .into_iter()
        .map(|category| {
            let shares = months
                .iter()
                .map(|m| {
                    let cell = cells.get(&(category.clone(), m.clone())).copied().unwrap_or(0.0);
                    percentage(cell, totals[m]).unwrap_or(0.0)
                })
                .collect();
            PivotRow { category, shares }
        })
        .collect();
    SharePivot {
        dimension,
        unit,
        month_totals: totals.into_values().collect(),
        months,
        rows,
    }
}

/// Records timestamped within `days` days of the latest timestamp.
pub fn recent_window(records: &[FlowRecord], days: u32) -> Vec<&FlowRecord> {
    let Some(latest) = records.iter().filter_map(FlowRecord::timestamp).max() else {
        return Vec::new();
    };
    // A window reaching past the calendar range keeps every timed record.
    let cutoff = latest.checked_sub_signed(Duration::days(i64::from(days)));
    records
        .iter()
        .filter(|r| r.timestamp().is_some_and(|t| cutoff.map_or(true, |c| t >= c)))
        .collect()
}
