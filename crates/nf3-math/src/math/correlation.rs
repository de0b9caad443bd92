//! Pearson correlation with pairwise-complete observations.

/// Pearson correlation of `xs` and `ys` over positions where both are finite.
///
/// Returns `None` with fewer than two complete pairs or when either side has
/// zero variance.
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((*x, *y)),
            _ => None,
        })
        .collect();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }
    Some((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}

/// Symmetric correlation matrix for a set of columns.
pub fn correlation_matrix(columns: &[Vec<Option<f64>>]) -> Vec<Vec<Option<f64>>> {
    let k = columns.len();
    let mut out = vec![vec![None; k]; k];
    for i in 0..k {
        for j in i..k {
            let r = pearson(&columns[i], &columns[j]);
            out[i][j] = r;
            out[j][i] = r;
        }
    }
    out
}
