//! NF3 flow analytics common types, IDs, and errors.
//!
//! This crate provides the vocabulary shared by the config, math, and core crates:
//! - Categorical dimensions of a flow record and their input column names
//! - Flow units and time granularities selectable by configuration
//! - Run identifiers and report schema versioning
//! - The unified error type
//! - Output format specifications

pub mod dimension;
pub mod error;
pub mod id;
pub mod output;
pub mod schema;
pub mod units;

pub use dimension::Dimension;
pub use error::{Error, Result};
pub use id::RunId;
pub use output::OutputFormat;
pub use schema::SCHEMA_VERSION;
pub use units::{FlowUnit, Granularity};
