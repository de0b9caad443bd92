//! Trailing-window means and partitioned running sums over ordered series.

use std::collections::HashMap;
use std::hash::Hash;

/// Trailing mean with a window of `window` elements.
///
/// The value at `i` is the mean of `values[i + 1 - min(i + 1, window)..=i]`:
/// no look-ahead, and partial windows at the start use what is available.
/// A window of zero is treated as one.
pub fn trailing_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &values[start..=i];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

/// Mean of the up-to-`window` elements *before* each position.
///
/// The first element has no history and yields `None`.
pub fn preceding_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let window = window.max(1);
    (0..values.len())
        .map(|i| {
            if i == 0 {
                return None;
            }
            let start = i.saturating_sub(window);
            let slice = &values[start..i];
            Some(slice.iter().sum::<f64>() / slice.len() as f64)
        })
        .collect()
}

/// Running total over the whole series.
pub fn cumulative_sum(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |acc, v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}

/// Running total computed independently inside each partition.
///
/// `keys[i]` names the partition of `values[i]`; the total for a partition
/// starts from zero at its first element and never carries across partitions.
///
/// # Panics
///
/// Panics if `values` and `keys` have different lengths.
pub fn partitioned_cumulative_sum<K>(values: &[f64], keys: &[K]) -> Vec<f64>
where
    K: Eq + Hash + Clone,
{
    assert_eq!(values.len(), keys.len(), "values and keys must align");
    let mut running: HashMap<K, f64> = HashMap::new();
    values
        .iter()
        .zip(keys)
        .map(|(v, k)| {
            let acc = running.entry(k.clone()).or_insert(0.0);
            *acc += v;
            *acc
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn trailing_mean_uses_partial_windows() {
        let v = [2.0, 4.0, 6.0, 8.0];
        assert_eq!(trailing_mean(&v, 3), vec![2.0, 3.0, 4.0, 6.0]);
        assert_eq!(trailing_mean(&v, 1), v.to_vec());
        assert_eq!(trailing_mean(&v, 0), v.to_vec());
        assert!(trailing_mean(&[], 7).is_empty());
    }

    #[test]
    fn preceding_mean_excludes_current() {
        let v = [1.0, 3.0, 5.0, 100.0];
        assert_eq!(
            preceding_mean(&v, 2),
            vec![None, Some(1.0), Some(2.0), Some(4.0)]
        );
    }

    #[test]
    fn partitioned_sum_resets_per_key() {
        let v = [1.0, 2.0, 3.0, 10.0, 20.0];
        let k = ["2024-01", "2024-01", "2024-01", "2024-02", "2024-02"];
        assert_eq!(
            partitioned_cumulative_sum(&v, &k),
            vec![1.0, 3.0, 6.0, 10.0, 30.0]
        );
        assert_eq!(cumulative_sum(&v), vec![1.0, 3.0, 6.0, 16.0, 36.0]);
    }

    proptest! {
        #[test]
        fn trailing_mean_stays_within_window_range(
            values in prop::collection::vec(-1e6f64..1e6, 1..80),
            window in 1usize..40,
        ) {
            let means = trailing_mean(&values, window);
            for (i, m) in means.iter().enumerate() {
                let start = (i + 1).saturating_sub(window);
                let slice = &values[start..=i];
                let lo = slice.iter().cloned().fold(f64::INFINITY, f64::min);
                let hi = slice.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                let tol = 1e-9 * (1.0 + lo.abs().max(hi.abs()));
                prop_assert!(*m >= lo - tol && *m <= hi + tol, "mean {} outside [{}, {}]", m, lo, hi);
            }
        }

        #[test]
        fn partition_first_element_equals_own_value(
            values in prop::collection::vec(0.0f64..1e4, 1..60),
            split in 0usize..60,
        ) {
            let split = split.min(values.len());
            let keys: Vec<u8> = (0..values.len()).map(|i| u8::from(i >= split)).collect();
            let sums = partitioned_cumulative_sum(&values, &keys);
            prop_assert_eq!(sums[0], values[0]);
            if split < values.len() {
                prop_assert_eq!(sums[split], values[split]);
            }
        }
    }
}
