//! The per-run pipeline: an owned, filtered record table plus its config.
//!
//! Construction ingests and filters once; every query borrows `&self` and
//! recomputes from the table, so results never depend on call order.

use std::path::Path;

use chrono::NaiveDate;
use nf3_common::{Dimension, FlowUnit, Granularity, Result};
use nf3_config::AnalysisConfig;
use serde::Serialize;
use tracing::{debug, info};

use crate::aggregate::{
    bucket_dimension_totals, bucket_totals, dimension_totals, BucketSeries, CategorySeries,
    DimensionTotal, FlowSeries,
};
use crate::filter::{filter_records, FilterSummary};
use crate::hierarchy::{build_hierarchy, HierarchyNode};
use crate::ingest::{load_csv, IngestReport, Ingested};
use crate::outlier::{AbnormalDetector, AbnormalPoint, IqrDetector};
use crate::record::FlowRecord;
use crate::reports::{self, CorrelationMatrix, CostSummary, FlowChanges, GlassMatch, GroupDay};
use crate::reports::{ChamberGlassCount, RankEntry, RecentDay, SharePivot};
use crate::timestamp::Bucket;
use nf3_math::IqrBounds;

/// One bucket with its IQR verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierRow {
    pub bucket: Bucket,
    pub value: f64,
    pub outlier: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierTable {
    pub granularity: Granularity,
    pub unit: FlowUnit,
    pub bounds: Option<IqrBounds>,
    pub rows: Vec<OutlierRow>,
}

impl OutlierTable {
    pub fn outlier_count(&self) -> usize {
        self.rows.iter().filter(|r| r.outlier).count()
    }
}

/// One (bucket, category) cell with its IQR verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryOutlierRow {
    pub bucket: Bucket,
    pub category: String,
    pub value: f64,
    pub outlier: bool,
}

/// IQR verdicts over every (bucket, category) cell of one dimension.
///
/// Fences are computed across all cells together, the way category ratio
/// series are screened before their shares are shown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryOutlierTable {
    pub dimension: Dimension,
    pub granularity: Granularity,
    pub unit: FlowUnit,
    pub bounds: Option<IqrBounds>,
    pub rows: Vec<CategoryOutlierRow>,
}

impl CategoryOutlierTable {
    pub fn outlier_count(&self) -> usize {
        self.rows.iter().filter(|r| r.outlier).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbnormalRow {
    pub bucket: Bucket,
    #[serde(flatten)]
    pub point: AbnormalPoint,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbnormalTable {
    pub granularity: Granularity,
    pub unit: FlowUnit,
    pub window: usize,
    pub multiplier: f64,
    pub rows: Vec<AbnormalRow>,
}

impl AbnormalTable {
    pub fn abnormal_count(&self) -> usize {
        self.rows.iter().filter(|r| r.point.abnormal).count()
    }
}

/// Glass and RPSC analyses.
///
/// Prefix matches and the RPSC glass count cover the whole filtered table;
/// the per-day tables cover the recent window only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlassReport {
    pub unit: FlowUnit,
    pub product_match: GlassMatch,
    pub recipe_match: GlassMatch,
    pub rpsc_glass_count: usize,
    pub recent_days: u32,
    pub layer_chamber_daily: Vec<GroupDay>,
    pub rpsc_chamber_daily: Vec<GroupDay>,
    pub chamber_glass_counts: Vec<ChamberGlassCount>,
}

/// Daily series after optional IQR exclusion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanDaily {
    pub series: FlowSeries,
    pub excluded_days: Vec<NaiveDate>,
}

/// Headline numbers for one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub unit: FlowUnit,
    pub granularity: Granularity,
    pub ingest: IngestReport,
    pub filter: FilterSummary,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub total_flow: f64,
    pub buckets: usize,
    pub untimed_records: usize,
    pub outlier_buckets: usize,
    pub abnormal_buckets: usize,
    pub rpsc_glass_count: usize,
    pub cost: CostSummary,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    config: AnalysisConfig,
    records: Vec<FlowRecord>,
    ingest: IngestReport,
    filter: FilterSummary,
}

impl Pipeline {
    /// Build from already-read records; the config's filters are applied here.
    ///
    /// Without the raw cells an empty flow cannot be told from a garbled one,
    /// so every `None` flow is counted as `missing_flow` and `garbled_flow`
    /// stays zero.
    pub fn new(records: Vec<FlowRecord>, config: AnalysisConfig) -> Self {
        let ingest = IngestReport {
            rows: records.len(),
            untimed: records.iter().filter(|r| r.timestamp().is_none()).count(),
            missing_flow: records.iter().filter(|r| r.flow_sccm().is_none()).count(),
            ..Default::default()
        };
        Self::from_ingested(Ingested { records, report: ingest }, config)
    }

    pub fn from_ingested(ingested: Ingested, config: AnalysisConfig) -> Self {
        let (records, filter) = filter_records(ingested.records, &config);
        info!(records = records.len(), unit = %config.unit, granularity = %config.granularity, "pipeline ready");
        Self {
            config,
            records,
            ingest: ingested.report,
            filter,
        }
    }

    /// Read a CSV file and build the pipeline.
    pub fn load(path: &Path, config: AnalysisConfig) -> Result<Self> {
        let ingested = load_csv(path, &config.correlation.parameters)?;
        Ok(Self::from_ingested(ingested, config))
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn records(&self) -> &[FlowRecord] {
        &self.records
    }

    pub fn ingest_report(&self) -> &IngestReport {
        &self.ingest
    }

    pub fn filter_summary(&self) -> &FilterSummary {
        &self.filter
    }

    fn unit(&self) -> FlowUnit {
        self.config.unit
    }

    fn on_date(&self, date: Option<NaiveDate>) -> impl Iterator<Item = &FlowRecord> {
        self.records
            .iter()
            .filter(move |r| date.is_none() || r.date() == date)
    }

    /// Latest date present, the default for date-scoped views.
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.records.iter().filter_map(FlowRecord::date).max()
    }

    pub fn bucket_totals(&self) -> BucketSeries {
        bucket_totals(&self.records, self.config.granularity, self.unit())
    }

    /// Bucket series with the configured rolling windows.
    pub fn series(&self) -> FlowSeries {
        FlowSeries::from_totals(&self.bucket_totals(), &self.config.rolling_windows)
    }

    /// Per-bucket category shares. With `outliers.exclude_from_shares` the
    /// IQR-flagged cells are dropped; the remaining shares keep their
    /// original bucket totals.
    pub fn shares(&self, dimension: Dimension) -> CategorySeries {
        let mut series =
            bucket_dimension_totals(&self.records, self.config.granularity, dimension, self.unit());
        if self.config.outliers.exclude_from_shares {
            let totals: Vec<f64> = series.rows.iter().map(|r| r.total).collect();
            let flags = IqrDetector::from_settings(&self.config.outliers).detect(&totals).flags;
            let before = series.rows.len();
            series.rows = series
                .rows
                .into_iter()
                .zip(flags)
                .filter_map(|(row, flagged)| (!flagged).then_some(row))
                .collect();
            debug!(dropped = before - series.rows.len(), %dimension, "outlier cells dropped from shares");
        }
        series
    }

    /// IQR screen over the (bucket, category) cells of `dimension`.
    pub fn category_outliers(&self, dimension: Dimension) -> CategoryOutlierTable {
        let series =
            bucket_dimension_totals(&self.records, self.config.granularity, dimension, self.unit());
        let totals: Vec<f64> = series.rows.iter().map(|r| r.total).collect();
        let report = IqrDetector::from_settings(&self.config.outliers).detect(&totals);
        CategoryOutlierTable {
            dimension,
            granularity: series.granularity,
            unit: series.unit,
            bounds: report.bounds,
            rows: series
                .rows
                .into_iter()
                .zip(report.flags)
                .map(|(row, outlier)| CategoryOutlierRow {
                    bucket: row.bucket,
                    category: row.category,
                    value: row.total,
                    outlier,
                })
                .collect(),
        }
    }

    pub fn distribution(&self, dimension: Dimension, date: Option<NaiveDate>) -> Vec<DimensionTotal> {
        dimension_totals(self.on_date(date), dimension, self.unit())
    }

    pub fn outliers(&self) -> OutlierTable {
        let totals = self.bucket_totals();
        let report = IqrDetector::from_settings(&self.config.outliers).detect(&totals.values());
        OutlierTable {
            granularity: totals.granularity,
            unit: totals.unit,
            bounds: report.bounds,
            rows: totals
                .rows
                .into_iter()
                .zip(report.flags)
                .map(|(row, outlier)| OutlierRow {
                    bucket: row.bucket,
                    value: row.total,
                    outlier,
                })
                .collect(),
        }
    }

    pub fn abnormal(&self) -> AbnormalTable {
        let totals = self.bucket_totals();
        let detector = AbnormalDetector::from_settings(&self.config.abnormal);
        let points = detector.detect(&totals.values());
        AbnormalTable {
            granularity: totals.granularity,
            unit: totals.unit,
            window: detector.window,
            multiplier: detector.multiplier,
            rows: totals
                .rows
                .into_iter()
                .zip(points)
                .map(|(row, point)| AbnormalRow {
                    bucket: row.bucket,
                    point,
                })
                .collect(),
        }
    }

    /// Breakdown along `dims` (the configured hierarchy when `None`).
    pub fn hierarchy(&self, dims: Option<&[Dimension]>, date: Option<NaiveDate>) -> Result<HierarchyNode> {
        let dims = dims.unwrap_or(&self.config.hierarchy);
        build_hierarchy(self.on_date(date), dims, self.unit())
    }

    /// Top chambers by flow on `date` (all dates when `None`).
    pub fn ranking(&self, date: Option<NaiveDate>) -> Vec<RankEntry> {
        reports::top_n(self.on_date(date), Dimension::Chamber, self.unit(), self.config.top_n)
    }

    pub fn flow_changes(&self, date: NaiveDate) -> Result<FlowChanges> {
        reports::flow_changes(&self.records, date, self.unit())
    }

    pub fn monthly_shares(&self, dimension: Dimension) -> SharePivot {
        reports::monthly_share_pivot(&self.records, dimension, self.unit())
    }

    pub fn recent_records(&self) -> Vec<&FlowRecord> {
        reports::recent_window(&self.records, self.config.recent_days)
    }

    pub fn glass_report(&self) -> GlassReport {
        let unit = self.unit();
        let recent = self.recent_records();
        GlassReport {
            unit,
            product_match: reports::glass_product_match(&self.records, unit),
            recipe_match: reports::glass_recipe_match(&self.records, unit),
            rpsc_glass_count: reports::rpsc_glass_count(&self.records),
            recent_days: self.config.recent_days,
            layer_chamber_daily: reports::layer_chamber_daily(recent.iter().copied(), unit),
            rpsc_chamber_daily: reports::rpsc_chamber_daily(recent.iter().copied(), unit),
            chamber_glass_counts: reports::glass_count_per_chamber(recent.iter().copied()),
        }
    }

    /// Parameter correlation for `step` (configured step when `None`).
    pub fn correlation(&self, step: Option<&str>, date: Option<NaiveDate>) -> CorrelationMatrix {
        let step = step.unwrap_or(&self.config.correlation.step);
        reports::parameter_correlation(&self.records, step, date, &self.config.correlation.parameters)
    }

    /// Daily SCCM series with IQR outlier days removed when configured.
    ///
    /// Cumulative sums are recomputed over the kept days, so they restart at
    /// the first kept day of every month.
    pub fn clean_daily(&self) -> CleanDaily {
        let daily = bucket_totals(&self.records, Granularity::Day, FlowUnit::Sccm);
        let flags = if self.config.outliers.exclude_from_totals {
            IqrDetector::new(self.config.outliers.iqr_multiplier)
                .detect(&daily.values())
                .flags
        } else {
            vec![false; daily.rows.len()]
        };
        let mut buckets = Vec::new();
        let mut values = Vec::new();
        let mut excluded_days = Vec::new();
        for (row, flagged) in daily.rows.into_iter().zip(flags) {
            if flagged {
                excluded_days.push(row.bucket.start);
            } else {
                values.push(row.total);
                buckets.push(row.bucket);
            }
        }
        if !excluded_days.is_empty() {
            debug!(days = excluded_days.len(), "excluded outlier days from daily totals");
        }
        CleanDaily {
            series: FlowSeries::from_values(
                Granularity::Day,
                FlowUnit::Sccm,
                buckets,
                &values,
                &self.config.rolling_windows,
            ),
            excluded_days,
        }
    }

    pub fn cost_summary(&self) -> CostSummary {
        reports::cost_summary(&self.clean_daily().series.values(), &self.config.cost)
    }

    pub fn recent_days(&self) -> Vec<RecentDay> {
        reports::recent_days_table(
            &self.clean_daily().series,
            self.unit(),
            self.config.recent_days as usize,
        )
    }

    pub fn summary(&self) -> RunSummary {
        let totals = self.bucket_totals();
        let dates = || self.records.iter().filter_map(FlowRecord::date);
        RunSummary {
            unit: self.unit(),
            granularity: self.config.granularity,
            ingest: self.ingest.clone(),
            filter: self.filter.clone(),
            first_date: dates().min(),
            last_date: dates().max(),
            total_flow: self.records.iter().map(|r| r.flow(self.unit())).sum(),
            buckets: totals.rows.len(),
            untimed_records: totals.excluded_untimed,
            outlier_buckets: self.outliers().outlier_count(),
            abnormal_buckets: self.abnormal().abnormal_count(),
            rpsc_glass_count: reports::rpsc_glass_count(&self.records),
            cost: self.cost_summary(),
        }
    }
}
