//! The flow record: one measurement row, enriched once at construction.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use nf3_common::dimension::UNKNOWN_CATEGORY;
use nf3_common::{Dimension, FlowUnit};
use serde::{Deserialize, Serialize};

use crate::convert::convert;
use crate::derive::{extract_layer, Layer};
use crate::timestamp::parse_tstamp;

/// Stored attributes of a row, as read from the input.
///
/// Empty categorical cells are `None`. `flow_sccm` is `None` when the cell
/// was empty or not a finite number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordFields {
    pub chamber: Option<String>,
    pub tool: Option<String>,
    pub recipe: Option<String>,
    pub operation: Option<String>,
    pub product: Option<String>,
    pub chamber_code: Option<String>,
    pub sin: Option<String>,
    pub glass: Option<String>,
    pub step_name: Option<String>,
    pub tstamp: String,
    pub flow_sccm: Option<f64>,
    /// Optional numeric process parameters keyed by column name.
    pub params: BTreeMap<String, f64>,
}

/// A row plus its derived layer and timestamp.
///
/// Derived values are computed in [`FlowRecord::new`] and only exposed through
/// accessors, so they always agree with the stored recipe and timestamp text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowRecord {
    #[serde(flatten)]
    fields: RecordFields,
    layer: Option<Layer>,
    timestamp: Option<NaiveDateTime>,
}

impl FlowRecord {
    pub fn new(fields: RecordFields) -> Self {
        let layer = fields.recipe.as_deref().and_then(extract_layer);
        let timestamp = parse_tstamp(&fields.tstamp);
        Self {
            fields,
            layer,
            timestamp,
        }
    }

    pub fn fields(&self) -> &RecordFields {
        &self.fields
    }

    pub fn layer(&self) -> Option<Layer> {
        self.layer
    }

    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        self.timestamp
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.timestamp.map(|t| t.date())
    }

    pub fn flow_sccm(&self) -> Option<f64> {
        self.fields.flow_sccm
    }

    /// Flow converted into `unit`; a missing flow counts as zero.
    pub fn flow(&self, unit: FlowUnit) -> f64 {
        convert(self.fields.flow_sccm.unwrap_or(0.0), unit)
    }

    /// Raw value of a categorical dimension, `None` when missing.
    pub fn value(&self, dimension: Dimension) -> Option<&str> {
        let f = &self.fields;
        let v = match dimension {
            Dimension::Chamber => &f.chamber,
            Dimension::Tool => &f.tool,
            Dimension::Recipe => &f.recipe,
            Dimension::Operation => &f.operation,
            Dimension::Product => &f.product,
            Dimension::ChamberCode => &f.chamber_code,
            Dimension::Sin => &f.sin,
            Dimension::Glass => &f.glass,
            Dimension::StepName => &f.step_name,
            Dimension::Layer => return self.layer.map(Layer::as_str),
        };
        v.as_deref()
    }

    /// Grouping key for a dimension; missing values group under `unknown`.
    pub fn category(&self, dimension: Dimension) -> &str {
        self.value(dimension).unwrap_or(UNKNOWN_CATEGORY)
    }

    pub fn param(&self, name: &str) -> Option<f64> {
        self.fields.params.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(recipe: &str, tstamp: &str, flow: Option<f64>) -> RecordFields {
        RecordFields {
            chamber: Some("CH01".into()),
            recipe: Some(recipe.into()),
            tstamp: tstamp.into(),
            flow_sccm: flow,
            ..Default::default()
        }
    }

    #[test]
    fn derives_layer_and_timestamp_once() {
        let r = FlowRecord::new(fields("RPSC_BP_001", "2024030108", Some(60_000.0)));
        assert_eq!(r.layer(), Some(Layer::Bp));
        assert_eq!(r.value(Dimension::Layer), Some("BP"));
        assert_eq!(r.date(), NaiveDate::from_ymd_opt(2024, 3, 1));
        assert!((r.flow(FlowUnit::KgPerSecond) - 3.04).abs() < 1e-12);
    }

    #[test]
    fn missing_values_become_unknown() {
        let r = FlowRecord::new(fields("XYZ123", "bad", None));
        assert_eq!(r.layer(), None);
        assert_eq!(r.category(Dimension::Layer), UNKNOWN_CATEGORY);
        assert_eq!(r.category(Dimension::Tool), UNKNOWN_CATEGORY);
        assert_eq!(r.category(Dimension::Chamber), "CH01");
        assert_eq!(r.timestamp(), None);
        assert_eq!(r.flow(FlowUnit::Sccm), 0.0);
    }
}
