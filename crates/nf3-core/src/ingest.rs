//! CSV ingestion.
//!
//! Columns are located by header name, so their order in the file does not
//! matter. Every required column must be present; optional process parameter
//! columns are picked up when they exist.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use nf3_common::{Dimension, Error, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::record::{FlowRecord, RecordFields};

pub const TSTAMP_COLUMN: &str = "TSTAMP";
pub const FLOW_COLUMN: &str = "NF3_total_Flow";

/// Every column that must appear in the header row.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    "CHAMBERID",
    "TOOLID",
    "RECIPEID",
    "OPERATION",
    "PRODUCT",
    "CHAMBER_CODE",
    "SIN",
    "GLASSID",
    "step_name",
    TSTAMP_COLUMN,
    FLOW_COLUMN,
];

/// Counts describing what ingestion kept and what it had to interpret.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub rows: usize,
    /// Rows whose flow cell was empty.
    pub missing_flow: usize,
    /// Rows whose flow cell was present but not a finite number.
    pub garbled_flow: usize,
    /// Rows whose timestamp did not parse.
    pub untimed: usize,
    /// Optional parameter columns found in the header.
    pub param_columns: Vec<String>,
}

/// Records read from one input plus the ingest report.
#[derive(Debug, Clone)]
pub struct Ingested {
    pub records: Vec<FlowRecord>,
    pub report: IngestReport,
}

struct Columns {
    chamber: usize,
    tool: usize,
    recipe: usize,
    operation: usize,
    product: usize,
    chamber_code: usize,
    sin: usize,
    glass: usize,
    step_name: usize,
    tstamp: usize,
    flow: usize,
    params: Vec<(String, usize)>,
}

impl Columns {
    fn locate(headers: &csv::StringRecord, wanted_params: &[String]) -> Result<Self> {
        let names: Vec<&str> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim())
            .collect();
        let col = |name: &str| -> Result<usize> {
            names
                .iter()
                .position(|h| *h == name)
                .ok_or_else(|| Error::MissingColumn {
                    column: name.to_string(),
                })
        };
        let params = wanted_params
            .iter()
            .filter_map(|p| col(p).ok().map(|i| (p.clone(), i)))
            .collect();
        Ok(Self {
            chamber: col(Dimension::Chamber.column())?,
            tool: col(Dimension::Tool.column())?,
            recipe: col(Dimension::Recipe.column())?,
            operation: col(Dimension::Operation.column())?,
            product: col(Dimension::Product.column())?,
            chamber_code: col(Dimension::ChamberCode.column())?,
            sin: col(Dimension::Sin.column())?,
            glass: col(Dimension::Glass.column())?,
            step_name: col(Dimension::StepName.column())?,
            tstamp: col(TSTAMP_COLUMN)?,
            flow: col(FLOW_COLUMN)?,
            params,
        })
    }
}

enum FlowCell {
    Value(f64),
    Missing,
    Garbled,
}

fn parse_flow(cell: &str) -> FlowCell {
    let cell = cell.trim();
    if cell.is_empty() {
        return FlowCell::Missing;
    }
    match cell.parse::<f64>() {
        Ok(v) if v.is_finite() => FlowCell::Value(v),
        _ => FlowCell::Garbled,
    }
}

fn text(record: &csv::StringRecord, idx: usize) -> Option<String> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Read records from CSV text.
///
/// `wanted_params` names optional numeric columns to keep for correlation;
/// names absent from the header are skipped.
pub fn read_csv<R: Read>(reader: R, wanted_params: &[String]) -> Result<Ingested> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let cols = Columns::locate(&headers, wanted_params)?;

    let mut report = IngestReport {
        param_columns: cols.params.iter().map(|(n, _)| n.clone()).collect(),
        ..Default::default()
    };
    let mut records = Vec::new();

    for row in rdr.records() {
        let row = row?;
        let flow_sccm = match parse_flow(row.get(cols.flow).unwrap_or("")) {
            FlowCell::Value(v) => Some(v),
            FlowCell::Missing => {
                report.missing_flow += 1;
                None
            }
            FlowCell::Garbled => {
                report.garbled_flow += 1;
                None
            }
        };
        let params: BTreeMap<String, f64> = cols
            .params
            .iter()
            .filter_map(|(name, idx)| {
                let v = row.get(*idx)?.trim().parse::<f64>().ok()?;
                v.is_finite().then(|| (name.clone(), v))
            })
            .collect();

        let record = FlowRecord::new(RecordFields {
            chamber: text(&row, cols.chamber),
            tool: text(&row, cols.tool),
            recipe: text(&row, cols.recipe),
            operation: text(&row, cols.operation),
            product: text(&row, cols.product),
            chamber_code: text(&row, cols.chamber_code),
            sin: text(&row, cols.sin),
            glass: text(&row, cols.glass),
            step_name: text(&row, cols.step_name),
            tstamp: row.get(cols.tstamp).unwrap_or("").to_string(),
            flow_sccm,
            params,
        });
        if record.timestamp().is_none() {
            report.untimed += 1;
        }
        records.push(record);
    }

    if records.is_empty() {
        return Err(Error::EmptyInput);
    }
    report.rows = records.len();
    if report.garbled_flow > 0 {
        warn!(
            rows = report.garbled_flow,
            "non-numeric flow values treated as missing"
        );
    }
    if report.untimed > 0 {
        debug!(rows = report.untimed, "rows with unparseable timestamps");
    }
    info!(rows = report.rows, params = report.param_columns.len(), "ingested input");
    Ok(Ingested { records, report })
}

/// Read records from a CSV file.
pub fn load_csv(path: &Path, wanted_params: &[String]) -> Result<Ingested> {
    debug!(path = %path.display(), "opening input");
    let file = File::open(path)?;
    read_csv(file, wanted_params)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "CHAMBERID,TOOLID,RECIPEID,OPERATION,PRODUCT,CHAMBER_CODE,SIN,GLASSID,step_name,TSTAMP,NF3_total_Flow,pressure";

    fn ingest(body: &str) -> Result<Ingested> {
        let text = format!("{HEADER}\n{body}");
        read_csv(text.as_bytes(), &["pressure".to_string(), "vdc".to_string()])
    }

    #[test]
    fn reads_rows_and_params() {
        let got = ingest("CH1,T1,RPSC_BP_1,OP1,ABCD01,C1,S1,ABCD99,CLN1,2024030108,60000,1.5\n")
            .unwrap();
        assert_eq!(got.report.rows, 1);
        assert_eq!(got.report.param_columns, vec!["pressure".to_string()]);
        let r = &got.records[0];
        assert_eq!(r.value(Dimension::Chamber), Some("CH1"));
        assert_eq!(r.flow_sccm(), Some(60_000.0));
        assert_eq!(r.param("pressure"), Some(1.5));
        assert!(r.layer().is_some());
    }

    #[test]
    fn counts_missing_and_garbled_flow() {
        let got = ingest(
            "CH1,T1,R,OP,P,C,S,G,CLN1,2024030108,,\n\
             CH1,T1,R,OP,P,C,S,G,CLN1,2024030108,abc,\n\
             CH1,T1,R,OP,P,C,S,G,CLN1,202403,5,\n",
        )
        .unwrap();
        assert_eq!(got.report.missing_flow, 1);
        assert_eq!(got.report.garbled_flow, 1);
        assert_eq!(got.report.untimed, 1);
        assert_eq!(got.records[1].flow_sccm(), None);
    }

    #[test]
    fn column_order_does_not_matter() {
        let text = "NF3_total_Flow,TSTAMP,step_name,GLASSID,SIN,CHAMBER_CODE,PRODUCT,OPERATION,RECIPEID,TOOLID,CHAMBERID\n\
                    10,2024010100,CLN2,G,S,C,P,O,R,T,CHX\n";
        let got = read_csv(text.as_bytes(), &[]).unwrap();
        assert_eq!(got.records[0].value(Dimension::Chamber), Some("CHX"));
        assert_eq!(got.records[0].flow_sccm(), Some(10.0));
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let text = "CHAMBERID,TOOLID\nCH1,T1\n";
        match read_csv(text.as_bytes(), &[]) {
            Err(Error::MissingColumn { column }) => assert_eq!(column, "RECIPEID"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn header_only_is_empty_input() {
        let text = format!("{HEADER}\n");
        assert!(matches!(
            read_csv(text.as_bytes(), &[]),
            Err(Error::EmptyInput)
        ));
    }
}
