//! Column statistics used by the describe and outlier sections.

use std::cmp::Ordering;

/// Drop nulls and sort ascending. NaNs are treated as equal so a stray NaN
/// cannot poison the sort.
pub fn sorted_present(values: &[Option<f64>]) -> Vec<f64> {
    let mut present: Vec<f64> = values.iter().flatten().copied().collect();
    present.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    present
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (ddof = 1). Undefined below two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = mean(values)?;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    Some(var.sqrt())
}

/// Quantile with linear interpolation between order statistics, over an
/// already-sorted slice. `q` is clamped to [0, 1].
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// The 1.5×IQR fences around the middle half of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IqrBounds {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub low: f64,
    pub high: f64,
}

pub fn iqr_bounds(values: &[Option<f64>]) -> Option<IqrBounds> {
    let sorted = sorted_present(values);
    let q1 = quantile(&sorted, 0.25)?;
    let q3 = quantile(&sorted, 0.75)?;
    let iqr = q3 - q1;
    Some(IqrBounds {
        q1,
        q3,
        iqr,
        low: q1 - 1.5 * iqr,
        high: q3 + 1.5 * iqr,
    })
}

/// Copy of a nullable series with values outside [low, high] nulled out.
/// Bounds are inclusive.
pub fn null_outside(values: &[Option<f64>], low: f64, high: f64) -> Vec<Option<f64>> {
    values
        .iter()
        .copied()
        .map(|v| v.filter(|x| *x >= low && *x <= high))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantile_interpolates_linearly() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&sorted, 0.25), Some(1.75));
        assert_eq!(quantile(&sorted, 0.5), Some(2.5));
        assert_eq!(quantile(&sorted, 0.75), Some(3.25));
        assert_eq!(quantile(&sorted, 0.0), Some(1.0));
        assert_eq!(quantile(&sorted, 1.0), Some(4.0));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn sample_std_uses_ddof_one() {
        let values = [1.0, 2.0, 3.0, 4.0];
        let std = sample_std(&values).expect("std");
        assert!((std - 1.2909944487358056).abs() < 1e-12);
        assert_eq!(sample_std(&[5.0]), None);
    }

    #[test]
    fn iqr_fences_catch_the_outlier() {
        let values: Vec<Option<f64>> =
            [1.0, 2.0, 3.0, 4.0, 5.0, 100.0].into_iter().map(Some).collect();
        let bounds = iqr_bounds(&values).expect("bounds");
        assert!((bounds.q1 - 2.25).abs() < 1e-12);
        assert!((bounds.q3 - 4.75).abs() < 1e-12);
        assert!((bounds.low - -1.5).abs() < 1e-12);
        assert!((bounds.high - 8.5).abs() < 1e-12);

        let nulled = null_outside(&values, bounds.low, bounds.high);
        assert_eq!(nulled[5], None);
        assert_eq!(nulled[..5], values[..5]);
    }

    #[test]
    fn null_outside_keeps_existing_nulls() {
        let values = [Some(1.0), None, Some(10.0)];
        let nulled = null_outside(&values, 0.0, 5.0);
        assert_eq!(nulled, vec![Some(1.0), None, None]);
    }

    #[test]
    fn sorted_present_drops_nulls() {
        let values = [Some(3.0), None, Some(1.0), Some(2.0)];
        assert_eq!(sorted_present(&values), vec![1.0, 2.0, 3.0]);
        assert_eq!(mean(&sorted_present(&values)), Some(2.0));
    }
}
