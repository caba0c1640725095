//! Bootstrap uncertainty for effect estimates.

use rand::prelude::*;
use rand::rngs::StdRng;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;
use tracing::debug;

use crate::estimators::{Estimator, ate};
use crate::input::{ChainDataset, InputError};
use crate::utils::{boot_index_bounds, usize_to_f64};

/// Errors for bootstrap configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InferenceError {
    #[error("bootstrap iterations must be positive")]
    InvalidIterations,
    #[error("alpha must lie in (0, 1), got {0}")]
    InvalidAlpha(f64),
    #[error("bootstrap statistic was non-finite in every resample")]
    NoFiniteDraws,
    #[error(transparent)]
    Input(#[from] InputError),
}

/// Bootstrap schedule.
#[derive(Debug, Clone, Copy)]
pub struct BootstrapOptions {
    /// Number of resamples.
    pub iterations: usize,
    /// RNG seed for reproducibility.
    pub seed: u64,
    /// Two-sided miscoverage of the intervals.
    pub alpha: f64,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            iterations: 200,
            seed: 42,
            alpha: 0.05,
        }
    }
}

impl BootstrapOptions {
    /// # Errors
    ///
    /// Returns `InferenceError` if the schedule is invalid.
    pub fn validate(self) -> Result<(), InferenceError> {
        if self.iterations == 0 {
            return Err(InferenceError::InvalidIterations);
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(InferenceError::InvalidAlpha(self.alpha));
        }
        Ok(())
    }
}

/// Interval for a scalar effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.lower..=self.upper).contains(&value)
    }
}

/// Point estimate with bootstrap spread.
#[derive(Debug, Clone)]
pub struct AteBootstrapSummary {
    /// Statistic on the full dataset.
    pub estimate: f64,
    pub bootstrap_mean: f64,
    pub standard_error: f64,
    pub percentile_ci: ConfidenceInterval,
    /// `estimate +/- z_{1 - alpha/2} * standard_error`.
    pub normal_ci: ConfidenceInterval,
    /// Finite resampled statistics, sorted ascending.
    pub draws: Vec<f64>,
}

/// Bootstrap the ATE of a named estimator.
///
/// # Errors
///
/// Returns `InferenceError` if the options are invalid.
pub fn bootstrap_ate(
    estimator: Estimator,
    data: &ChainDataset,
    options: BootstrapOptions,
) -> Result<AteBootstrapSummary, InferenceError> {
    bootstrap_statistic(|resample| ate(estimator, resample), data, options)
}

/// Bootstrap any scalar statistic of a chain dataset by resampling rows with
/// replacement. Non-finite resampled values are dropped.
///
/// # Errors
///
/// Returns `InferenceError` if the options are invalid or no resample gives a
/// finite value.
pub fn bootstrap_statistic<F>(
    statistic: F,
    data: &ChainDataset,
    options: BootstrapOptions,
) -> Result<AteBootstrapSummary, InferenceError>
where
    F: Fn(&ChainDataset) -> f64,
{
    options.validate()?;

    let n = data.n_rows();
    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut draws = Vec::with_capacity(options.iterations);
    for _ in 0..options.iterations {
        let indices = (0..n).map(|_| rng.random_range(0..n)).collect::<Vec<_>>();
        let value = statistic(&data.select_rows(&indices)?);
        if value.is_finite() {
            draws.push(value);
        }
    }
    if draws.is_empty() {
        return Err(InferenceError::NoFiniteDraws);
    }
    debug!(
        requested = options.iterations,
        kept = draws.len(),
        "bootstrap resamples"
    );

    draws.sort_by(f64::total_cmp);
    let estimate = statistic(data);
    let bootstrap_mean = draws.iter().sum::<f64>() / usize_to_f64(draws.len());
    let standard_error = sample_std(&draws, bootstrap_mean);

    let (lower_idx, upper_idx) = boot_index_bounds(options.alpha, draws.len());
    let last = draws.len() - 1;
    let percentile_ci = ConfidenceInterval {
        lower: draws[lower_idx.min(last)],
        upper: draws[upper_idx.min(last)],
    };

    let z = normal_quantile(1.0 - options.alpha / 2.0);
    let normal_ci = ConfidenceInterval {
        lower: z.mul_add(-standard_error, estimate),
        upper: z.mul_add(standard_error, estimate),
    };

    Ok(AteBootstrapSummary {
        estimate,
        bootstrap_mean,
        standard_error,
        percentile_ci,
        normal_ci,
        draws,
    })
}

fn sample_std(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let sumsq = values
        .iter()
        .map(|value| (value - mean) * (value - mean))
        .sum::<f64>();
    (sumsq / (usize_to_f64(values.len()) - 1.0)).max(0.0).sqrt()
}

fn normal_quantile(p: f64) -> f64 {
    Normal::new(0.0, 1.0).map_or(f64::NAN, |normal| normal.inverse_cdf(p))
}
