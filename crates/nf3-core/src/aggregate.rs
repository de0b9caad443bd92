//! Time-bucketed and categorical aggregation of converted flow.
//!
//! Every aggregate takes an iterator of record references so callers can
//! aggregate the whole table or any pre-filtered subset without copying.

use std::collections::BTreeMap;

use nf3_common::{Dimension, FlowUnit, Granularity};
use nf3_math::{change_rates, partitioned_cumulative_sum, percentage, safe_ratio, trailing_mean};
use serde::Serialize;

use crate::record::FlowRecord;
use crate::timestamp::{bucket_for, month_key, Bucket};

/// Summed flow of one time bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketTotal {
    pub bucket: Bucket,
    pub total: f64,
    pub mean: f64,
    pub count: usize,
}

/// Chronological bucket totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketSeries {
    pub granularity: Granularity,
    pub unit: FlowUnit,
    pub rows: Vec<BucketTotal>,
    /// Records left out because their timestamp did not parse.
    pub excluded_untimed: usize,
}

impl BucketSeries {
    pub fn values(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.total).collect()
    }

    pub fn total(&self) -> f64 {
        self.rows.iter().map(|r| r.total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Flow of one category inside one bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub bucket: Bucket,
    pub category: String,
    pub total: f64,
    pub count: usize,
    /// Share of the bucket total, `None` when the bucket total is zero.
    pub ratio: Option<f64>,
    pub percentage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySeries {
    pub dimension: Dimension,
    pub granularity: Granularity,
    pub unit: FlowUnit,
    pub rows: Vec<CategoryShare>,
    pub bucket_totals: Vec<BucketTotal>,
    pub excluded_untimed: usize,
}

/// Non-temporal total of one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionTotal {
    pub category: String,
    pub total: f64,
    pub count: usize,
    pub ratio: Option<f64>,
    pub percentage: Option<f64>,
}

#[derive(Default)]
struct Acc {
    total: f64,
    count: usize,
}

impl Acc {
    fn add(&mut self, v: f64) {
        self.total += v;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total / self.count as f64
        }
    }
}

/// Sum converted flow per time bucket, in chronological order.
pub fn bucket_totals<'a, I>(records: I, granularity: Granularity, unit: FlowUnit) -> BucketSeries
where
    I: IntoIterator<Item = &'a FlowRecord>,
{
    let mut buckets: BTreeMap<Bucket, Acc> = BTreeMap::new();
    let mut excluded_untimed = 0;
    for r in records {
        match r.date() {
            Some(date) => buckets
                .entry(bucket_for(date, granularity))
                .or_default()
                .add(r.flow(unit)),
            None => excluded_untimed += 1,
        }
    }
    BucketSeries {
        granularity,
        unit,
        rows: buckets
            .into_iter()
            .map(|(bucket, acc)| BucketTotal {
                bucket,
                mean: acc.mean(),
                total: acc.total,
                count: acc.count,
            })
            .collect(),
        excluded_untimed,
    }
}

/// Sum converted flow per (bucket, category) with each category's share of
/// its bucket. Missing category values group under `unknown`.
pub fn bucket_dimension_totals<'a, I>(
    records: I,
    granularity: Granularity,
    dimension: Dimension,
    unit: FlowUnit,
) -> CategorySeries
where
    I: IntoIterator<Item = &'a FlowRecord>,
{
    let mut cells: BTreeMap<(Bucket, String), Acc> = BTreeMap::new();
    let mut totals: BTreeMap<Bucket, Acc> = BTreeMap::new();
    let mut excluded_untimed = 0;
    for r in records {
        let Some(date) = r.date() else {
            excluded_untimed += 1;
            continue;
        };
        let bucket = bucket_for(date, granularity);
        let v = r.flow(unit);
        totals.entry(bucket.clone()).or_default().add(v);
        cells
            .entry((bucket, r.category(dimension).to_string()))
            .or_default()
            .add(v);
    }
    let rows = cells
        .into_iter()
        .map(|((bucket, category), acc)| {
            let bucket_total = totals.get(&bucket).map_or(0.0, |t| t.total);
            CategoryShare {
                ratio: safe_ratio(acc.total, bucket_total),
                percentage: percentage(acc.total, bucket_total),
                bucket,
                category,
                total: acc.total,
                count: acc.count,
            }
        })
        .collect();
    CategorySeries {
        dimension,
        granularity,
        unit,
        rows,
        bucket_totals: totals
            .into_iter()
            .map(|(bucket, acc)| BucketTotal {
                bucket,
                mean: acc.mean(),
                total: acc.total,
                count: acc.count,
            })
            .collect(),
        excluded_untimed,
    }
}

/// Total converted flow per category, ignoring time. Untimed records count.
pub fn dimension_totals<'a, I>(records: I, dimension: Dimension, unit: FlowUnit) -> Vec<DimensionTotal>
where
    I: IntoIterator<Item = &'a FlowRecord>,
{
    let mut groups: BTreeMap<String, Acc> = BTreeMap::new();
    for r in records {
        groups
            .entry(r.category(dimension).to_string())
            .or_default()
            .add(r.flow(unit));
    }
    let grand: f64 = groups.values().map(|a| a.total).sum();
    groups
        .into_iter()
        .map(|(category, acc)| DimensionTotal {
            ratio: safe_ratio(acc.total, grand),
            percentage: percentage(acc.total, grand),
            category,
            total: acc.total,
            count: acc.count,
        })
        .collect()
}

/// One bucket of a [`FlowSeries`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowPoint {
    pub bucket: Bucket,
    pub value: f64,
    /// Trailing mean keyed by window size.
    pub rolling: BTreeMap<usize, f64>,
    /// Running total that restarts with every calendar month.
    pub cumulative_month: f64,
    /// Percent change vs. the previous bucket.
    pub change_rate: Option<f64>,
}

/// Bucket series with rolling means, month-reset cumulative sums and
/// period-over-period change rates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowSeries {
    pub granularity: Granularity,
    pub unit: FlowUnit,
    pub windows: Vec<usize>,
    pub points: Vec<FlowPoint>,
}

impl FlowSeries {
    pub fn from_totals(series: &BucketSeries, windows: &[usize]) -> Self {
        let buckets: Vec<Bucket> = series.rows.iter().map(|r| r.bucket.clone()).collect();
        Self::from_values(series.granularity, series.unit, buckets, &series.values(), windows)
    }

    /// Build from parallel bucket and value vectors (already chronological).
    pub fn from_values(
        granularity: Granularity,
        unit: FlowUnit,
        buckets: Vec<Bucket>,
        values: &[f64],
        windows: &[usize],
    ) -> Self {
        let means: Vec<(usize, Vec<f64>)> = windows
            .iter()
            .map(|&w| (w, trailing_mean(values, w)))
            .collect();
        let months: Vec<String> = buckets.iter().map(|b| month_key(b.start)).collect();
        let cumulative = partitioned_cumulative_sum(values, &months);
        let changes = change_rates(values);

        let points = buckets
            .into_iter()
            .enumerate()
            .map(|(i, bucket)| FlowPoint {
                bucket,
                value: values[i],
                rolling: means.iter().map(|(w, m)| (*w, m[i])).collect(),
                cumulative_month: cumulative[i],
                change_rate: changes[i],
            })
            .collect();
        Self {
            granularity,
            unit,
            windows: windows.to_vec(),
            points,
        }
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordFields;

    fn rec(chamber: Option<&str>, tstamp: &str, sccm: f64) -> FlowRecord {
        FlowRecord::new(RecordFields {
            chamber: chamber.map(String::from),
            tstamp: tstamp.into(),
            flow_sccm: Some(sccm),
            ..Default::default()
        })
    }

    fn sample() -> Vec<FlowRecord> {
        vec![
            rec(Some("A"), "2024013108", 10.0),
            rec(Some("B"), "2024013109", 30.0),
            rec(Some("A"), "2024020108", 20.0),
            rec(None, "2024020110", 20.0),
            rec(Some("A"), "202402", 99.0),
        ]
    }

    #[test]
    fn daily_totals_skip_untimed() {
        let s = bucket_totals(&sample(), Granularity::Day, FlowUnit::Sccm);
        assert_eq!(s.excluded_untimed, 1);
        assert_eq!(s.values(), vec![40.0, 40.0]);
        assert_eq!(s.rows[0].bucket.label, "2024-01-31");
        assert_eq!(s.rows[0].count, 2);
        assert_eq!(s.rows[0].mean, 20.0);
    }

    #[test]
    fn shares_sum_to_bucket_total() {
        let s = bucket_dimension_totals(&sample(), Granularity::Day, Dimension::Chamber, FlowUnit::Sccm);
        let feb: Vec<&CategoryShare> = s.rows.iter().filter(|r| r.bucket.label == "2024-02-01").collect();
        assert_eq!(feb.len(), 2);
        assert_eq!(feb[1].category, "unknown");
        let pct: f64 = feb.iter().filter_map(|r| r.percentage).sum();
        assert!((pct - 100.0).abs() < 1e-9);
        assert_eq!(s.bucket_totals.len(), 2);
    }

    #[test]
    fn zero_bucket_total_has_no_ratio() {
        let recs = vec![rec(Some("A"), "2024010100", 0.0)];
        let s = bucket_dimension_totals(&recs, Granularity::Day, Dimension::Chamber, FlowUnit::Sccm);
        assert_eq!(s.rows[0].ratio, None);
    }

    #[test]
    fn dimension_totals_include_untimed() {
        let t = dimension_totals(&sample(), Dimension::Chamber, FlowUnit::Sccm);
        let a = t.iter().find(|d| d.category == "A").unwrap();
        assert_eq!(a.total, 129.0);
        assert_eq!(a.count, 3);
    }

    #[test]
    fn flow_series_resets_cumsum_monthly() {
        let s = bucket_totals(&sample(), Granularity::Day, FlowUnit::Sccm);
        let fs = FlowSeries::from_totals(&s, &[7]);
        assert_eq!(fs.points[0].cumulative_month, 40.0);
        // 2024-02-01 starts a new month.
        assert_eq!(fs.points[1].cumulative_month, 40.0);
        assert_eq!(fs.points[1].rolling[&7], 40.0);
        assert_eq!(fs.points[0].change_rate, None);
        assert_eq!(fs.points[1].change_rate, Some(0.0));
    }
}
