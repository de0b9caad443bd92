//! Sample quantiles and interquartile-range bounds.
//!
//! Quantiles use linear interpolation between closest ranks: for `n` sorted
//! finite values the `p` quantile sits at position `(n - 1) * p`. Non-finite
//! values are ignored, matching the skip-missing behaviour callers expect.

use serde::{Deserialize, Serialize};

/// Quantile `p` in `[0, 1]` of `values` by linear interpolation.
///
/// Returns `None` when there is no finite value or `p` is out of range.
pub fn quantile(values: &[f64], p: f64) -> Option<f64> {
    if !(0.0..=1.0).contains(&p) {
        return None;
    }
    let sorted = sorted_finite(values);
    quantile_sorted(&sorted, p)
}

/// Quantile on an already sorted, finite slice.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&p) {
        return None;
    }
    let pos = (sorted.len() - 1) as f64 * p;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

fn sorted_finite(values: &[f64]) -> Vec<f64> {
    let mut out: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    out.sort_by(|a, b| a.total_cmp(b));
    out
}

/// Tukey fences derived from the interquartile range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IqrBounds {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    /// Multiplier applied to the IQR (1.5 for the classic fences).
    pub multiplier: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrBounds {
    /// True when `value` lies strictly outside `[lower, upper]`.
    pub fn is_outside(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }
}

/// Compute IQR fences over a reference population.
///
/// Needs at least two finite values; a single point has no spread to judge
/// against, so `None` is returned and callers must flag nothing.
pub fn iqr_bounds(values: &[f64], multiplier: f64) -> Option<IqrBounds> {
    let sorted = sorted_finite(values);
    if sorted.len() < 2 {
        return None;
    }
    let q1 = quantile_sorted(&sorted, 0.25)?;
    let q3 = quantile_sorted(&sorted, 0.75)?;
    let iqr = q3 - q1;
    Some(IqrBounds {
        q1,
        q3,
        iqr,
        multiplier,
        lower: q1 - multiplier * iqr,
        upper: q3 + multiplier * iqr,
    })
}
