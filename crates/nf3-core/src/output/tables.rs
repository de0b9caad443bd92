//! [`Render`] implementations for every report body.

use super::{fmt2, fmt_opt_pct, num, opt, Render, Table};
use crate::aggregate::{CategorySeries, DimensionTotal, FlowSeries};
use crate::hierarchy::HierarchyNode;
use crate::pipeline::{AbnormalTable, CategoryOutlierTable, GlassReport, OutlierTable, RunSummary};
use crate::reports::{CorrelationMatrix, CostSummary, FlowChanges, RankEntry, RecentDay, SharePivot};

fn kv(pairs: Vec<(&str, String)>) -> Table {
    let mut t = Table::new(["key", "value"]);
    for (k, v) in pairs {
        t.push(vec![k.to_string(), v]);
    }
    t
}

fn date_or_na(d: Option<chrono::NaiveDate>) -> String {
    d.map(|d| d.to_string()).unwrap_or_else(|| "n/a".to_string())
}

impl Render for RunSummary {
    fn table(&self) -> Table {
        kv(vec![
            ("unit", self.unit.to_string()),
            ("granularity", self.granularity.to_string()),
            ("rows", self.ingest.rows.to_string()),
            ("kept", self.filter.kept.to_string()),
            ("dropped", self.filter.dropped.to_string()),
            ("first_date", date_or_na(self.first_date)),
            ("last_date", date_or_na(self.last_date)),
            ("total_flow", num(self.total_flow)),
            ("buckets", self.buckets.to_string()),
            ("untimed_records", self.untimed_records.to_string()),
            ("outlier_buckets", self.outlier_buckets.to_string()),
            ("abnormal_buckets", self.abnormal_buckets.to_string()),
            ("rpsc_glass_count", self.rpsc_glass_count.to_string()),
            ("total_cost", num(self.cost.total_cost)),
            ("total_co2e_kg", num(self.cost.total_co2e_kg)),
        ])
    }

    fn summary(&self) -> Vec<String> {
        vec![
            format!(
                "{} rows read, {} kept after filters, {} untimed",
                self.ingest.rows, self.filter.kept, self.untimed_records
            ),
            format!(
                "{} .. {}: total {} {} over {} {} buckets",
                date_or_na(self.first_date),
                date_or_na(self.last_date),
                fmt2(self.total_flow),
                self.unit,
                self.buckets,
                self.granularity
            ),
            format!(
                "{} outlier buckets, {} abnormal buckets, {} RPSC glasses",
                self.outlier_buckets, self.abnormal_buckets, self.rpsc_glass_count
            ),
            format!(
                "cost {} at {}/kg, {} kg CO2e",
                fmt2(self.cost.total_cost),
                fmt2(self.cost.price_per_kg),
                fmt2(self.cost.total_co2e_kg)
            ),
        ]
    }
}

impl Render for FlowSeries {
    fn table(&self) -> Table {
        let mut headers = vec!["bucket".to_string(), "start".to_string(), "value".to_string()];
        headers.extend(self.windows.iter().map(|w| format!("rolling_{}", w)));
        headers.push("cumulative_month".to_string());
        headers.push("change_rate".to_string());
        let mut t = Table::new(headers);
        for p in &self.points {
            let mut row = vec![p.bucket.label.clone(), p.bucket.start.to_string(), num(p.value)];
            row.extend(self.windows.iter().map(|w| opt(p.rolling.get(w).copied())));
            row.push(num(p.cumulative_month));
            row.push(opt(p.change_rate));
            t.push(row);
        }
        t
    }

    fn summary(&self) -> Vec<String> {
        let Some(last) = self.points.last() else {
            return vec!["no timed records".to_string()];
        };
        let mut lines = vec![format!(
            "{} {} buckets in {}",
            self.points.len(),
            self.granularity,
            self.unit
        )];
        lines.push(format!(
            "latest {}: {} ({} vs previous)",
            last.bucket.label,
            fmt2(last.value),
            fmt_opt_pct(last.change_rate)
        ));
        for (w, m) in &last.rolling {
            lines.push(format!("{}-bucket mean {}", w, fmt2(*m)));
        }
        lines
    }
}

impl Render for CategorySeries {
    fn table(&self) -> Table {
        let mut t = Table::new(["bucket", "category", "total", "count", "ratio", "percentage"]);
        for r in &self.rows {
            t.push(vec![
                r.bucket.label.clone(),
                r.category.clone(),
                num(r.total),
                r.count.to_string(),
                opt(r.ratio),
                opt(r.percentage),
            ]);
        }
        t
    }

    fn summary(&self) -> Vec<String> {
        let Some(last) = self.bucket_totals.last() else {
            return vec!["no timed records".to_string()];
        };
        let mut lines = vec![format!("{} shares for {}", self.dimension, last.bucket.label)];
        lines.extend(
            self.rows
                .iter()
                .filter(|r| r.bucket == last.bucket)
                .map(|r| format!("{}: {} ({})", r.category, fmt2(r.total), fmt_opt_pct(r.percentage))),
        );
        lines
    }
}

impl Render for Vec<DimensionTotal> {
    fn table(&self) -> Table {
        let mut t = Table::new(["category", "total", "count", "ratio", "percentage"]);
        for r in self {
            t.push(vec![
                r.category.clone(),
                num(r.total),
                r.count.to_string(),
                opt(r.ratio),
                opt(r.percentage),
            ]);
        }
        t
    }

    fn summary(&self) -> Vec<String> {
        self.iter()
            .map(|r| format!("{}: {} ({})", r.category, fmt2(r.total), fmt_opt_pct(r.percentage)))
            .collect()
    }
}

impl Render for SharePivot {
    fn table(&self) -> Table {
        let mut headers = vec![self.dimension.to_string()];
        headers.extend(self.months.iter().cloned());
        let mut t = Table::new(headers);
        for r in &self.rows {
            let mut row = vec![r.category.clone()];
            row.extend(r.shares.iter().map(|s| num(*s)));
            t.push(row);
        }
        let mut totals = vec!["total".to_string()];
        totals.extend(self.month_totals.iter().map(|v| num(*v)));
        t.push(totals);
        t
    }

    fn summary(&self) -> Vec<String> {
        self.months
            .iter()
            .zip(&self.month_totals)
            .map(|(m, v)| format!("{}: {} {}", m, fmt2(*v), self.unit))
            .collect()
    }
}

impl Render for OutlierTable {
    fn table(&self) -> Table {
        let mut t = Table::new(["bucket", "value", "outlier"]);
        for r in &self.rows {
            t.push(vec![r.bucket.label.clone(), num(r.value), r.outlier.to_string()]);
        }
        t
    }

    fn summary(&self) -> Vec<String> {
        let mut lines = match &self.bounds {
            Some(b) => vec![format!(
                "Q1 {} Q3 {} IQR {} fences [{}, {}]",
                fmt2(b.q1),
                fmt2(b.q3),
                fmt2(b.iqr),
                fmt2(b.lower),
                fmt2(b.upper)
            )],
            None => vec!["too few buckets for IQR bounds".to_string()],
        };
        lines.push(format!("{} of {} buckets flagged", self.outlier_count(), self.rows.len()));
        lines.extend(
            self.rows
                .iter()
                .filter(|r| r.outlier)
                .map(|r| format!("{}: {}", r.bucket.label, fmt2(r.value))),
        );
        lines
    }
}

impl Render for CategoryOutlierTable {
    fn table(&self) -> Table {
        let mut t = Table::new(["bucket", "category", "value", "outlier"]);
        for r in &self.rows {
            t.push(vec![
                r.bucket.label.clone(),
                r.category.clone(),
                num(r.value),
                r.outlier.to_string(),
            ]);
        }
        t
    }

    fn summary(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "{} of {} {} cells flagged",
            self.outlier_count(),
            self.rows.len(),
            self.dimension
        )];
        if let Some(b) = &self.bounds {
            lines.push(format!("fences [{}, {}]", fmt2(b.lower), fmt2(b.upper)));
        }
        lines.extend(
            self.rows
                .iter()
                .filter(|r| r.outlier)
                .map(|r| format!("{} {}: {}", r.bucket.label, r.category, fmt2(r.value))),
        );
        lines
    }
}

impl Render for AbnormalTable {
    fn table(&self) -> Table {
        let mut t = Table::new(["bucket", "value", "baseline", "times", "abnormal"]);
        for r in &self.rows {
            t.push(vec![
                r.bucket.label.clone(),
                num(r.point.value),
                opt(r.point.baseline),
                opt(r.point.times),
                r.point.abnormal.to_string(),
            ]);
        }
        t
    }

    fn summary(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "{} of {} buckets above {}x the {}-bucket average",
            self.abnormal_count(),
            self.rows.len(),
            self.multiplier,
            self.window
        )];
        lines.extend(self.rows.iter().filter(|r| r.point.abnormal).map(|r| {
            format!(
                "{}: {} (baseline {}, {}x)",
                r.bucket.label,
                fmt2(r.point.value),
                r.point.baseline.map(fmt2).unwrap_or_else(|| "n/a".into()),
                r.point.times.map(|t| format!("{:.1}", t)).unwrap_or_else(|| "inf".into())
            )
        }));
        lines
    }
}

impl Render for HierarchyNode {
    fn table(&self) -> Table {
        let mut t = Table::new(["id", "parent", "label", "depth", "value"]);
        for r in self.flatten() {
            t.push(vec![
                r.id,
                r.parent.unwrap_or_default(),
                r.label,
                r.depth.to_string(),
                num(r.value),
            ]);
        }
        t
    }

    fn summary(&self) -> Vec<String> {
        let mut lines = vec![format!("{}: {}", self.name, fmt2(self.value))];
        for child in &self.children {
            lines.push(format!("  {}: {} ({} leaves)", child.name, fmt2(child.value), child.leaf_count()));
        }
        lines
    }
}

impl Render for Vec<RankEntry> {
    fn table(&self) -> Table {
        let mut t = Table::new(["rank", "category", "total"]);
        for r in self {
            t.push(vec![r.rank.to_string(), r.category.clone(), num(r.total)]);
        }
        t
    }

    fn summary(&self) -> Vec<String> {
        self.iter()
            .map(|r| format!("{:>2}. {} {}", r.rank, r.category, fmt2(r.total)))
            .collect()
    }
}

impl Render for FlowChanges {
    fn table(&self) -> Table {
        kv(vec![
            ("date", self.date.to_string()),
            ("unit", self.unit.to_string()),
            ("day_total", num(self.day_total)),
            ("previous_day_total", opt(self.previous_day_total)),
            ("day_change_rate", opt(self.day_change_rate)),
            ("month", self.month.clone()),
            ("month_total", num(self.month_total)),
            ("previous_month_total", opt(self.previous_month_total)),
            ("month_change_rate", opt(self.month_change_rate)),
        ])
    }

    fn summary(&self) -> Vec<String> {
        vec![
            format!(
                "{}: {} {} ({} vs previous day)",
                self.date,
                fmt2(self.day_total),
                self.unit,
                fmt_opt_pct(self.day_change_rate)
            ),
            format!(
                "{}: {} {} ({} vs previous month)",
                self.month,
                fmt2(self.month_total),
                self.unit,
                fmt_opt_pct(self.month_change_rate)
            ),
        ]
    }
}

impl Render for GlassReport {
    fn table(&self) -> Table {
        let mut t = Table::new(["layer", "chamber", "date", "total_flow", "glass_count", "flow_per_glass"]);
        for r in &self.layer_chamber_daily {
            t.push(vec![
                r.keys.first().cloned().unwrap_or_default(),
                r.keys.get(1).cloned().unwrap_or_default(),
                r.date.to_string(),
                num(r.total_flow),
                r.glass_count.to_string(),
                opt(r.flow_per_glass),
            ]);
        }
        t
    }

    fn summary(&self) -> Vec<String> {
        vec![
            format!(
                "glass/product match: {} glasses, {} {}, {} per glass",
                self.product_match.glass_count,
                fmt2(self.product_match.total_flow),
                self.unit,
                self.product_match.flow_per_glass.map(fmt2).unwrap_or_else(|| "n/a".into())
            ),
            format!(
                "glass/recipe match (RPSC count): {} glasses, {} per glass",
                self.recipe_match.glass_count,
                self.recipe_match.flow_per_glass.map(fmt2).unwrap_or_else(|| "n/a".into())
            ),
            format!("RPSC glass ids: {}", self.rpsc_glass_count),
            format!(
                "last {} days: {} chambers, {} layer/chamber/day groups",
                self.recent_days,
                self.chamber_glass_counts.len(),
                self.layer_chamber_daily.len()
            ),
        ]
    }
}

impl Render for CorrelationMatrix {
    fn table(&self) -> Table {
        let mut headers = vec!["parameter".to_string()];
        headers.extend(self.parameters.iter().cloned());
        let mut t = Table::new(headers);
        for (name, row) in self.parameters.iter().zip(&self.matrix) {
            let mut cells = vec![name.clone()];
            cells.extend(row.iter().map(|c| opt(*c)));
            t.push(cells);
        }
        t
    }

    fn summary(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "step {} ({} records, {} parameters)",
            self.step,
            self.observations,
            self.parameters.len()
        )];
        let mut pairs: Vec<(f64, &str, &str)> = Vec::new();
        for i in 0..self.parameters.len() {
            for j in (i + 1)..self.parameters.len() {
                if let Some(r) = self.matrix[i][j] {
                    pairs.push((r, self.parameters[i].as_str(), self.parameters[j].as_str()));
                }
            }
        }
        pairs.sort_by(|a, b| b.0.abs().total_cmp(&a.0.abs()));
        lines.extend(
            pairs
                .into_iter()
                .take(5)
                .map(|(r, a, b)| format!("{} ~ {}: {:+.2}", a, b, r)),
        );
        lines
    }
}

impl Render for Vec<RecentDay> {
    fn table(&self) -> Table {
        let mut t = Table::new(["date", "kg_per_second", "liters_per_second", "sccm", "cumulative", "top"]);
        for d in self {
            t.push(vec![
                d.date.to_string(),
                num(d.kg_per_second),
                num(d.liters_per_second),
                num(d.sccm),
                num(d.cumulative),
                d.top.to_string(),
            ]);
        }
        t
    }

    fn summary(&self) -> Vec<String> {
        self.iter()
            .map(|d| {
                format!(
                    "{}{} {} kg/s, cumulative {}",
                    if d.top { "*" } else { " " },
                    d.date,
                    fmt2(d.kg_per_second),
                    fmt2(d.cumulative)
                )
            })
            .collect()
    }
}

impl Render for CostSummary {
    fn table(&self) -> Table {
        kv(vec![
            ("days", self.days.to_string()),
            ("total_kg", num(self.total_kg)),
            ("price_per_kg", num(self.price_per_kg)),
            ("total_cost", num(self.total_cost)),
            ("gwp", num(self.gwp)),
            ("total_co2e_kg", num(self.total_co2e_kg)),
        ])
    }

    fn summary(&self) -> Vec<String> {
        vec![
            format!("{} days, {} kg", self.days, fmt2(self.total_kg)),
            format!("cost {} at {}/kg", fmt2(self.total_cost), fmt2(self.price_per_kg)),
            format!("{} kg CO2e (GWP {})", fmt2(self.total_co2e_kg), self.gwp),
        ]
    }
}
