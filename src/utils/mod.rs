/////////////////////////////////////////////////////////////////////////////////////////////\
//
// Shared numeric helpers for estimators and the EM routine.
//
// Created on: 18 Oct 2026
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Utilities
//!
//! Floored ratios, clipped logarithms, column reductions over faer vectors,
//! and index bounds for bootstrap intervals.

use faer::Mat;
use num_traits::ToPrimitive;

/// Smallest denominator admitted by any ratio in the crate.
pub const DENOMINATOR_FLOOR: f64 = 1.0e-12;

/// Probability substituted for an empty stratum.
pub const NEUTRAL_PROBABILITY: f64 = 0.5;

#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    f64::from(u32::try_from(value).unwrap_or(u32::MAX))
}

#[must_use]
pub const fn indicator(flag: bool) -> f64 {
    if flag { 1.0 } else { 0.0 }
}

/// `numerator / max(denominator, 1e-12)`.
#[must_use]
pub fn floored_ratio(numerator: f64, denominator: f64) -> f64 {
    numerator / denominator.max(DENOMINATOR_FLOOR)
}

/// `ln(max(value, 1e-12))`, finite for every probability.
#[must_use]
pub fn clipped_ln(value: f64) -> f64 {
    value.max(DENOMINATOR_FLOOR).ln()
}

#[must_use]
pub fn sum_column(vector: &Mat<f64>) -> f64 {
    (0..vector.nrows()).map(|i| vector[(i, 0)]).sum()
}

#[must_use]
pub fn mean_column(vector: &Mat<f64>) -> f64 {
    sum_column(vector) / usize_to_f64(vector.nrows())
}

/// Sum of `weights[i] * values[i]` over rows.
#[must_use]
pub fn weighted_sum(values: &Mat<f64>, weights: &Mat<f64>) -> f64 {
    (0..values.nrows())
        .map(|i| weights[(i, 0)] * values[(i, 0)])
        .sum()
}

#[must_use]
pub fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

#[must_use]
pub fn matrix_is_finite(matrix: &Mat<f64>) -> bool {
    for i in 0..matrix.nrows() {
        for j in 0..matrix.ncols() {
            if !matrix[(i, j)].is_finite() {
                return false;
            }
        }
    }
    true
}

#[must_use]
pub fn boot_index_bounds(alpha: f64, n: usize) -> (usize, usize) {
    let n_f = usize_to_f64(n);
    let lower_idx = ((alpha / 2.0) * n_f).floor().to_usize().unwrap_or(0);
    let upper_idx = ((1.0 - alpha / 2.0) * n_f)
        .ceil()
        .to_usize()
        .unwrap_or(0)
        .saturating_sub(1);
    (lower_idx, upper_idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn floored_ratio_never_divides_by_zero() {
        assert_relative_eq!(floored_ratio(0.0, 0.0), 0.0);
        assert!(floored_ratio(1.0, 0.0).is_finite());
        assert_relative_eq!(floored_ratio(3.0, 4.0), 0.75);
    }

    #[test]
    fn clipped_ln_is_finite_at_zero() {
        assert!(clipped_ln(0.0).is_finite());
        assert_relative_eq!(clipped_ln(1.0), 0.0);
    }

    #[test]
    fn column_reductions_match_manual_sums() {
        let values = Mat::from_fn(4, 1, |i, _| usize_to_f64(i));
        let weights = Mat::from_fn(4, 1, |i, _| if i % 2 == 0 { 1.0 } else { 0.5 });
        assert_relative_eq!(sum_column(&values), 6.0);
        assert_relative_eq!(mean_column(&values), 1.5);
        assert_relative_eq!(weighted_sum(&values, &weights), 0.5 + 2.0 + 1.5);
    }

    #[test]
    fn max_abs_diff_matches_expected_value() {
        let max = max_abs_diff(&[0.0, 1.0, 2.0], &[0.0, 0.0, 10.0]);
        assert_relative_eq!(max, 8.0);
    }

    #[test]
    fn matrix_is_finite_detects_nan() {
        let matrix = Mat::from_fn(2, 1, |i, _| if i == 0 { 1.0 } else { f64::NAN });
        assert!(!matrix_is_finite(&matrix));
    }

    #[test]
    fn boot_index_bounds_are_ordered_and_in_range() {
        let (lower, upper) = boot_index_bounds(0.1, 100);
        assert!(lower <= upper);
        assert!(upper < 100);
    }
}
