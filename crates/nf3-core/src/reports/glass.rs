//! Glass-level consumption: how much gas each processed glass costs.
//!
//! A record "matches" a product or recipe when its glass id shares the same
//! four-character prefix code.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveDateTime};
use nf3_common::{Dimension, FlowUnit};
use nf3_math::safe_ratio;
use serde::Serialize;

use crate::derive::{is_rpsc, prefixes_match};
use crate::record::FlowRecord;

/// Mean flow of one (key, timestamp) group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimedMean {
    pub key: String,
    pub timestamp: NaiveDateTime,
    pub mean_flow: f64,
}

/// Records whose glass prefix matched another identifier's prefix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlassMatch {
    pub matched_records: usize,
    pub glass_count: usize,
    pub total_flow: f64,
    /// `None` when no glass matched.
    pub flow_per_glass: Option<f64>,
    /// Grouped by glass id for product matches, by chamber for recipe matches.
    pub timed_means: Vec<TimedMean>,
}

fn summarize<'a>(
    matched: impl Iterator<Item = &'a FlowRecord>,
    group_by: Dimension,
    unit: FlowUnit,
) -> GlassMatch {
    let mut glasses = BTreeSet::new();
    let mut total = 0.0;
    let mut count = 0;
    let mut groups: BTreeMap<(String, NaiveDateTime), (f64, usize)> = BTreeMap::new();
    for r in matched {
        count += 1;
        let v = r.flow(unit);
        total += v;
        if let Some(g) = r.value(Dimension::Glass) {
            glasses.insert(g.to_string());
        }
        if let Some(ts) = r.timestamp() {
            let e = groups
                .entry((r.category(group_by).to_string(), ts))
                .or_insert((0.0, 0));
            e.0 += v;
            e.1 += 1;
        }
    }
    GlassMatch {
        matched_records: count,
        glass_count: glasses.len(),
        total_flow: total,
        flow_per_glass: safe_ratio(total, glasses.len() as f64),
        timed_means: groups
            .into_iter()
            .map(|((key, timestamp), (sum, n))| TimedMean {
                key,
                timestamp,
                mean_flow: sum / n as f64,
            })
            .collect(),
    }
}

fn prefix_matches(r: &FlowRecord, other: Dimension) -> bool {
    match (r.value(Dimension::Glass), r.value(other)) {
        (Some(glass), Some(id)) => prefixes_match(glass, id),
        _ => false,
    }
}

/// Glass whose prefix equals the product prefix.
pub fn glass_product_match<'a, I>(records: I, unit: FlowUnit) -> GlassMatch
where
    I: IntoIterator<Item = &'a FlowRecord>,
{
    summarize(
        records
            .into_iter()
            .filter(|r| prefix_matches(r, Dimension::Product)),
        Dimension::Glass,
        unit,
    )
}

/// Glass whose prefix equals the recipe prefix (the RPSC count).
pub fn glass_recipe_match<'a, I>(records: I, unit: FlowUnit) -> GlassMatch
where
    I: IntoIterator<Item = &'a FlowRecord>,
{
    summarize(
        records
            .into_iter()
            .filter(|r| prefix_matches(r, Dimension::Recipe)),
        Dimension::Chamber,
        unit,
    )
}

/// Distinct glass ids processed by an `RPSC` recipe.
pub fn rpsc_glass_count<'a, I>(records: I) -> usize
where
    I: IntoIterator<Item = &'a FlowRecord>,
{
    records
        .into_iter()
        .filter(|r| r.value(Dimension::Recipe).is_some_and(is_rpsc))
        .filter_map(|r| r.value(Dimension::Glass))
        .collect::<BTreeSet<_>>()
        .len()
}

/// Flow and distinct glass count of one group on one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupDay {
    /// Group key values, e.g. `[layer, chamber]`.
    pub keys: Vec<String>,
    pub date: NaiveDate,
    pub total_flow: f64,
    pub glass_count: usize,
    pub flow_per_glass: Option<f64>,
}

fn group_daily<'a>(
    records: impl Iterator<Item = &'a FlowRecord>,
    dims: &[Dimension],
    unit: FlowUnit,
) -> Vec<GroupDay> {
    let mut groups: BTreeMap<(Vec<String>, NaiveDate), (f64, BTreeSet<String>)> = BTreeMap::new();
    for r in records {
        let Some(date) = r.date() else { continue };
        let keys = dims.iter().map(|d| r.category(*d).to_string()).collect();
        let e = groups.entry((keys, date)).or_default();
        e.0 += r.flow(unit);
        if let Some(g) = r.value(Dimension::Glass) {
            e.1.insert(g.to_string());
        }
    }
    groups
        .into_iter()
        .map(|((keys, date), (total, glasses))| GroupDay {
            keys,
            date,
            total_flow: total,
            glass_count: glasses.len(),
            flow_per_glass: safe_ratio(total, glasses.len() as f64),
        })
        .collect()
}

/// Per (layer, chamber, day) flow and flow per glass.
pub fn layer_chamber_daily<'a, I>(records: I, unit: FlowUnit) -> Vec<GroupDay>
where
    I: IntoIterator<Item = &'a FlowRecord>,
{
    group_daily(
        records.into_iter(),
        &[Dimension::Layer, Dimension::Chamber],
        unit,
    )
}

/// Per (chamber, day) flow per glass over RPSC recipes only.
pub fn rpsc_chamber_daily<'a, I>(records: I, unit: FlowUnit) -> Vec<GroupDay>
where
    I: IntoIterator<Item = &'a FlowRecord>,
{
    group_daily(
        records
            .into_iter()
            .filter(|r| r.value(Dimension::Recipe).is_some_and(is_rpsc)),
        &[Dimension::Chamber],
        unit,
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChamberGlassCount {
    pub chamber: String,
    pub glass_count: usize,
}

pub fn glass_count_per_chamber<'a, I>(records: I) -> Vec<ChamberGlassCount>
where
    I: IntoIterator<Item = &'a FlowRecord>,
{
    let mut per: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();
    for r in records {
        let entry = per.entry(r.category(Dimension::Chamber).to_string()).or_default();
        if let Some(g) = r.value(Dimension::Glass) {
            entry.insert(g);
        }
    }
    per.into_iter()
        .map(|(chamber, glasses)| ChamberGlassCount {
            chamber,
            glass_count: glasses.len(),
        })
        .collect()
}
