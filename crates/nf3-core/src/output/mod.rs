//! Report envelope and rendering to JSON, CSV or a text summary.

mod tables;

use std::io::Write;

use chrono::{DateTime, Local};
use nf3_common::{OutputFormat, Result, RunId, SCHEMA_VERSION};
use nf3_config::ConfigSnapshot;
use serde::Serialize;

/// Flat rendering of a report body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }
}

/// Report bodies that can be shown as a table and as a short summary.
pub trait Render {
    fn table(&self) -> Table;
    fn summary(&self) -> Vec<String>;
}

/// Envelope shared by every report: provenance plus the body.
#[derive(Debug, Clone, Serialize)]
pub struct Report<T> {
    pub schema_version: &'static str,
    pub run_id: RunId,
    pub generated_at: DateTime<Local>,
    pub command: String,
    pub config: ConfigSnapshot,
    pub data: T,
}

impl<T> Report<T> {
    pub fn new(command: impl Into<String>, config: ConfigSnapshot, data: T) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            run_id: RunId::new(),
            generated_at: Local::now(),
            command: command.into(),
            config,
            data,
        }
    }
}

/// Write `report` to `out` in the requested format.
pub fn write_report<T, W>(out: &mut W, format: OutputFormat, report: &Report<T>) -> Result<()>
where
    T: Serialize + Render,
    W: Write,
{
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, report)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => write_table(out, &report.data.table())?,
        OutputFormat::Summary => {
            writeln!(
                out,
                "{} [{}] config {}",
                report.command,
                report.run_id,
                &report.config.config_hash[..12.min(report.config.config_hash.len())]
            )?;
            for line in report.data.summary() {
                writeln!(out, "  {}", line)?;
            }
        }
    }
    Ok(())
}

pub fn write_table<W: Write>(out: &mut W, table: &Table) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(&table.headers)?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub(crate) fn num(v: f64) -> String {
    format!("{}", v)
}

pub(crate) fn opt(v: Option<f64>) -> String {
    v.map(num).unwrap_or_default()
}

/// Fixed-precision number for summaries.
pub(crate) fn fmt2(v: f64) -> String {
    format!("{:.2}", v)
}

pub(crate) fn fmt_opt_pct(v: Option<f64>) -> String {
    v.map(|p| format!("{:+.2}%", p))
        .unwrap_or_else(|| "n/a".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nf3_config::{AnalysisConfig, ConfigSource, ResolvedConfig};

    struct Pair(f64);

    impl Serialize for Pair {
        fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
            s.serialize_f64(self.0)
        }
    }

    impl Render for Pair {
        fn table(&self) -> Table {
            let mut t = Table::new(["value"]);
            t.push(vec![num(self.0)]);
            t
        }
        fn summary(&self) -> Vec<String> {
            vec![format!("value {}", fmt2(self.0))]
        }
    }

    fn report() -> Report<Pair> {
        let resolved = ResolvedConfig {
            config: AnalysisConfig::default(),
            source: ConfigSource::Defaults,
        };
        Report::new("test", ConfigSnapshot::capture(&resolved).unwrap(), Pair(1.5))
    }

    fn render(format: OutputFormat) -> String {
        let mut buf = Vec::new();
        write_report(&mut buf, format, &report()).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn json_has_envelope() {
        let v: serde_json::Value = serde_json::from_str(&render(OutputFormat::Json)).unwrap();
        assert_eq!(v["schema_version"], SCHEMA_VERSION);
        assert_eq!(v["data"], 1.5);
        assert_eq!(v["config"]["source"]["kind"], "defaults");
        assert!(v["run_id"].as_str().unwrap().starts_with("run-"));
    }

    #[test]
    fn csv_and_summary() {
        assert_eq!(render(OutputFormat::Csv), "value\n1.5\n");
        let text = render(OutputFormat::Summary);
        assert!(text.starts_with("test [run-"));
        assert!(text.contains("  value 1.50"));
    }

    #[test]
    fn formatting_helpers() {
        assert_eq!(opt(None), "");
        assert_eq!(fmt_opt_pct(Some(12.5)), "+12.50%");
        assert_eq!(fmt_opt_pct(None), "n/a");
    }
}
