//! Outlier detection over ordered numeric series.
//!
//! Two independent rules:
//! - [`IqrDetector`]: Tukey fences around the interquartile range.
//! - [`AbnormalDetector`]: a bucket exceeding N times its recent average.

use nf3_config::{AbnormalSettings, Baseline, OutlierSettings};
use nf3_math::{iqr_bounds, preceding_mean, safe_ratio, trailing_mean, IqrBounds};
use serde::Serialize;

/// Interquartile-range rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IqrDetector {
    pub multiplier: f64,
    /// Ratio-series variant: negative values are outliers regardless of fences.
    pub flag_negative: bool,
}

impl Default for IqrDetector {
    fn default() -> Self {
        Self {
            multiplier: 1.5,
            flag_negative: false,
        }
    }
}

/// Fences plus one flag per input element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierReport {
    /// `None` when the series had fewer than two finite values.
    pub bounds: Option<IqrBounds>,
    pub flags: Vec<bool>,
}

impl OutlierReport {
    pub fn count(&self) -> usize {
        self.flags.iter().filter(|f| **f).count()
    }

    pub fn indices(&self) -> Vec<usize> {
        self.flags
            .iter()
            .enumerate()
            .filter_map(|(i, f)| f.then_some(i))
            .collect()
    }
}

impl IqrDetector {
    pub fn new(multiplier: f64) -> Self {
        Self {
            multiplier,
            ..Self::default()
        }
    }

    pub fn from_settings(settings: &OutlierSettings) -> Self {
        Self {
            multiplier: settings.iqr_multiplier,
            flag_negative: settings.flag_negative,
        }
    }

    /// Flag elements of `values`.
    ///
    /// Quartiles come from the full series before anything is flagged, so the
    /// result does not depend on element order.
    pub fn detect(&self, values: &[f64]) -> OutlierReport {
        let Some(bounds) = iqr_bounds(values, self.multiplier) else {
            return OutlierReport {
                bounds: None,
                flags: vec![false; values.len()],
            };
        };
        let flags = values
            .iter()
            .map(|&v| bounds.is_outside(v) || (self.flag_negative && v < 0.0))
            .collect();
        OutlierReport {
            bounds: Some(bounds),
            flags,
        }
    }
}

/// "N times the recent average" rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbnormalDetector {
    pub window: usize,
    pub multiplier: f64,
    pub baseline: Baseline,
}

impl Default for AbnormalDetector {
    fn default() -> Self {
        Self::from_settings(&AbnormalSettings::default())
    }
}

/// Evaluation of one element against its baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbnormalPoint {
    pub value: f64,
    /// Mean the value is compared with; `None` when there is no history.
    pub baseline: Option<f64>,
    /// `value / baseline`, `None` when the baseline is absent or not positive.
    pub times: Option<f64>,
    pub abnormal: bool,
}

impl AbnormalDetector {
    pub fn from_settings(settings: &AbnormalSettings) -> Self {
        Self {
            window: settings.window,
            multiplier: settings.multiplier,
            baseline: settings.baseline,
        }
    }

    pub fn detect(&self, values: &[f64]) -> Vec<AbnormalPoint> {
        let baselines: Vec<Option<f64>> = match self.baseline {
            Baseline::Preceding => preceding_mean(values, self.window),
            Baseline::Inclusive => trailing_mean(values, self.window)
                .into_iter()
                .map(Some)
                .collect(),
        };
        values
            .iter()
            .zip(baselines)
            .map(|(&value, baseline)| {
                let times = baseline.filter(|b| *b > 0.0).and_then(|b| safe_ratio(value, b));
                AbnormalPoint {
                    value,
                    baseline,
                    times,
                    abnormal: self.is_abnormal(value, baseline, times),
                }
            })
            .collect()
    }

    /// The verdict follows `times`; a zero baseline flags any positive value
    /// and a negative baseline flags nothing.
    fn is_abnormal(&self, value: f64, baseline: Option<f64>, times: Option<f64>) -> bool {
        match (baseline, times) {
            (_, Some(t)) => t > self.multiplier,
            (Some(b), None) if b == 0.0 => value > 0.0,
            _ => false,
        }
    }
}
