//! Division helpers that report undefined results instead of producing
//! infinities or NaN.

/// `numerator / denominator`, or `None` when the denominator is zero or the
/// result would not be finite.
pub fn safe_ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 || !denominator.is_finite() || !numerator.is_finite() {
        return None;
    }
    Some(numerator / denominator)
}

/// Share of `part` in `total`, in percent.
pub fn percentage(part: f64, total: f64) -> Option<f64> {
    safe_ratio(part, total).map(|r| r * 100.0)
}

/// Percent change from `previous` to `current`.
///
/// Undefined for a missing or zero previous value.
pub fn change_rate(previous: Option<f64>, current: f64) -> Option<f64> {
    let prev = previous?;
    safe_ratio(current - prev, prev).map(|r| r * 100.0)
}

/// Period-over-period change rates for an ordered series.
pub fn change_rates(values: &[f64]) -> Vec<Option<f64>> {
    let mut prev = None;
    values
        .iter()
        .map(|&v| {
            let rate = change_rate(prev, v);
            prev = Some(v);
            rate
        })
        .collect()
}

/// Round to `decimals` places, half away from zero.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}
