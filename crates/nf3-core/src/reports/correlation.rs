//! Pairwise correlation of process parameters within one step.

use chrono::NaiveDate;
use nf3_common::Dimension;
use nf3_math::correlation_matrix;
use serde::Serialize;

use crate::record::FlowRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub step: String,
    pub date: Option<NaiveDate>,
    /// Records of the step (and date) that were considered.
    pub observations: usize,
    /// Parameters with at least one value, in the requested order.
    pub parameters: Vec<String>,
    /// `matrix[i][j]` is the Pearson correlation of parameters `i` and `j`,
    /// `None` with fewer than two complete pairs or zero variance.
    pub matrix: Vec<Vec<Option<f64>>>,
}

/// Correlate `parameters` over records of `step`, optionally on one date.
pub fn parameter_correlation<'a, I>(
    records: I,
    step: &str,
    date: Option<NaiveDate>,
    parameters: &[String],
) -> CorrelationMatrix
where
    I: IntoIterator<Item = &'a FlowRecord>,
{
    let selected: Vec<&FlowRecord> = records
        .into_iter()
        .filter(|r| r.value(Dimension::StepName) == Some(step))
        .filter(|r| date.is_none() || r.date() == date)
        .collect();

    let (names, columns): (Vec<String>, Vec<Vec<Option<f64>>>) = parameters
        .iter()
        .map(|p| (p.clone(), selected.iter().map(|r| r.param(p)).collect::<Vec<_>>()))
        .filter(|(_, col)| col.iter().any(Option::is_some))
        .unzip();

    CorrelationMatrix {
        step: step.to_string(),
        date,
        observations: selected.len(),
        matrix: correlation_matrix(&columns),
        parameters: names,
    }
}
