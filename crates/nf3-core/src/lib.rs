//! NF3 flow analytics core.
//!
//! This crate provides the batch pipeline that turns raw NF3 gas-flow
//! records into operator reports:
//! - CSV ingestion with header-name column lookup
//! - Timestamp normalization and calendar bucketing
//! - Layer and prefix-code derivation from identifiers
//! - SCCM unit conversion, cost and emissions
//! - Bucketed and categorical aggregation with rolling statistics
//! - IQR and "N times the recent average" outlier rules
//! - Hierarchical breakdowns whose parents always sum their children
//! - Dashboard, glass, correlation and cost reports
//! - Report rendering to JSON, CSV and text summaries

pub mod aggregate;
pub mod config_cli;
pub mod convert;
pub mod derive;
pub mod exit_codes;
pub mod filter;
pub mod hierarchy;
pub mod ingest;
pub mod logging;
pub mod outlier;
pub mod output;
pub mod pipeline;
pub mod record;
pub mod reports;
pub mod timestamp;

pub use aggregate::{bucket_dimension_totals, bucket_totals, dimension_totals, FlowSeries};
pub use convert::{convert, to_sccm};
pub use derive::{extract_layer, prefix_code, prefixes_match, Layer};
pub use exit_codes::ExitCode;
pub use hierarchy::{build_hierarchy, HierarchyNode};
pub use ingest::{load_csv, read_csv, IngestReport};
pub use outlier::{AbnormalDetector, IqrDetector, OutlierReport};
pub use pipeline::Pipeline;
pub use record::{FlowRecord, RecordFields};
pub use timestamp::{bucket_for, parse_tstamp, Bucket};
