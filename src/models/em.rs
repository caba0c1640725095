/////////////////////////////////////////////////////////////////////////////////////////////\
//
// Expectation-maximization for the chain with a partially missing mediator.
//
// Created on: 18 Oct 2026
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # EM for a missing mediator
//!
//! Recovers the four chain parameters when `B` is missing for an arbitrary
//! subset of rows, assuming missingness does not depend on the unobserved `B`
//! beyond what `A` and `C` explain.
//!
//! - Initialization: complete-case conditionals, `0.5` for empty strata.
//! - E-step: posterior `P(B=1 | A, C)` for missing rows; observed rows keep
//!   their indicator.
//! - M-step: fractional-count updates of `P(B=1|A)` and `P(C=1|B)`.
//! - Stopping: absolute change of a pseudo-log-likelihood below `tolerance`,
//!   or `max_iter` iterations.
//!
//! The pseudo-log-likelihood scores each row with a hard mediator label that
//! is `1` whenever the posterior weight is non-zero. This is not the expected
//! complete-data log-likelihood of textbook EM; it only drives the stopping
//! rule.

use faer::Mat;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::input::{ChainDataset, TreatmentLevel};
use crate::models::chain::ChainParameters;
use crate::utils::{
    NEUTRAL_PROBABILITY, clipped_ln, floored_ratio, indicator, matrix_is_finite, max_abs_diff,
    sum_column, weighted_sum,
};

/// Previous score before the first iteration.
const INITIAL_LOG_LIKELIHOOD: f64 = -1.0e18;

/// Errors returned by EM configuration and fitting.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum EmError {
    #[error("max_iter must be positive")]
    InvalidIterations,
    #[error("tolerance must be finite and non-negative, got {0}")]
    InvalidTolerance(f64),
    #[error("EM produced non-finite posterior weights")]
    NonFinitePosterior,
}

/// EM configuration.
#[derive(Debug, Clone, Copy)]
pub struct EmOptions {
    /// Iteration cap.
    pub max_iter: usize,
    /// Convergence threshold on the pseudo-log-likelihood change.
    pub tolerance: f64,
    /// Seed recorded in the report; the recursion itself is deterministic.
    pub seed: u64,
}

impl Default for EmOptions {
    fn default() -> Self {
        Self {
            max_iter: 50,
            tolerance: 1e-6,
            seed: 0,
        }
    }
}

impl EmOptions {
    /// # Errors
    ///
    /// Returns `EmError` if the iteration cap or tolerance is invalid.
    pub fn validate(self) -> Result<(), EmError> {
        if self.max_iter == 0 {
            return Err(EmError::InvalidIterations);
        }
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(EmError::InvalidTolerance(self.tolerance));
        }
        Ok(())
    }
}

/// Convergence diagnostics for one EM run.
#[derive(Debug, Clone)]
pub struct EmReport {
    /// Iterations performed, at most `max_iter`.
    pub iterations: usize,
    /// True if the stopping rule fired before the cap.
    pub converged: bool,
    /// Final pseudo-log-likelihood.
    pub log_likelihood: f64,
    /// Pseudo-log-likelihood after each iteration.
    pub log_likelihood_trace: Vec<f64>,
    /// Rows whose mediator was missing.
    pub missing_mediator: usize,
    /// Largest parameter change in the last iteration.
    pub last_parameter_change: f64,
    pub seed: u64,
}

/// Fit chain parameters by EM with a partially missing mediator.
///
/// # Errors
///
/// Returns `EmError` if the options are invalid or the posterior degenerates.
///
/// # Examples
///
/// ```
/// use causal_chain_models::{ChainDataset, EmOptions, fit_chain_missing_mediator};
///
/// let data = ChainDataset::from_binary_columns(
///     &[0, 0, 1, 1, 1, 0],
///     &[Some(0), None, Some(1), Some(1), None, Some(1)],
///     &[0, 1, 1, 0, 1, 1],
/// )
/// .expect("binary columns");
///
/// let (params, report) = fit_chain_missing_mediator(&data, EmOptions::default()).expect("em");
/// assert!(report.iterations <= 50);
/// assert!(params.validate().is_ok());
/// ```
pub fn fit_chain_missing_mediator(
    data: &ChainDataset,
    options: EmOptions,
) -> Result<(ChainParameters, EmReport), EmError> {
    options.validate()?;

    let outcome = data.outcome_column();
    let treated = data.treatment_column();
    let untreated = Mat::from_fn(data.n_rows(), 1, |i, _| 1.0 - treated[(i, 0)]);

    let mut params = ChainParameters::from_empirical(data);
    let mut last = INITIAL_LOG_LIKELIHOOD;
    let mut trace = Vec::with_capacity(options.max_iter);
    let mut converged = false;
    let mut last_parameter_change = 0.0;

    debug!(
        rows = data.n_rows(),
        missing = data.n_missing_mediator(),
        ?params,
        "EM initialized from complete cases"
    );

    for iteration in 1..=options.max_iter {
        let post = expectation_step(data, &params);
        if !matrix_is_finite(&post) {
            return Err(EmError::NonFinitePosterior);
        }

        let updated = maximization_step(&post, &outcome, &treated, &untreated);
        last_parameter_change = parameter_change(&params, &updated);
        params = updated;

        let ll = pseudo_log_likelihood(data, &post, &params);
        trace.push(ll);
        debug!(iteration, ll, last_parameter_change, "EM iteration");

        if (ll - last).abs() < options.tolerance {
            converged = true;
            break;
        }
        last = ll;
    }

    let iterations = trace.len();
    let log_likelihood = trace.last().copied().unwrap_or(INITIAL_LOG_LIKELIHOOD);
    if converged {
        info!(iterations, log_likelihood, "EM converged");
    } else {
        warn!(
            iterations,
            tolerance = options.tolerance,
            "EM stopped at the iteration cap without meeting the tolerance"
        );
    }

    Ok((
        params,
        EmReport {
            iterations,
            converged,
            log_likelihood,
            log_likelihood_trace: trace,
            missing_mediator: data.n_missing_mediator(),
            last_parameter_change,
            seed: options.seed,
        },
    ))
}

/// Parameters only, with the conventional call-time arguments.
///
/// # Errors
///
/// Returns `EmError` if `max_iter` is zero or `tol` is invalid.
pub fn em_chain_missing_b(
    data: &ChainDataset,
    max_iter: usize,
    tol: f64,
    seed: u64,
) -> Result<ChainParameters, EmError> {
    let options = EmOptions {
        max_iter,
        tolerance: tol,
        seed,
    };
    fit_chain_missing_mediator(data, options).map(|(params, _report)| params)
}

/// `P(B=1 | A, C)` per row; observed mediators are returned unchanged.
fn expectation_step(data: &ChainDataset, params: &ChainParameters) -> Mat<f64> {
    Mat::from_fn(data.n_rows(), 1, |i, _| match data.mediator()[i] {
        Some(b) => indicator(b),
        None => mediator_posterior(params, data.treatment()[i], data.outcome()[i]),
    })
}

fn mediator_posterior(params: &ChainParameters, treatment: bool, outcome: bool) -> f64 {
    let p_b1 = params.mediator_rate(TreatmentLevel::from(treatment));
    let p_b0 = 1.0 - p_b1;
    let (like_b1, like_b0) = if outcome {
        (params.p_c1_given_b1, params.p_c1_given_b0)
    } else {
        (1.0 - params.p_c1_given_b1, 1.0 - params.p_c1_given_b0)
    };
    let numerator = p_b1 * like_b1;
    floored_ratio(numerator, p_b0.mul_add(like_b0, numerator))
}

fn maximization_step(
    post: &Mat<f64>,
    outcome: &Mat<f64>,
    treated: &Mat<f64>,
    untreated: &Mat<f64>,
) -> ChainParameters {
    let p_b1_given_a0 = fractional_rate(weighted_sum(post, untreated), sum_column(untreated));
    let p_b1_given_a1 = fractional_rate(weighted_sum(post, treated), sum_column(treated));

    let w0 = Mat::from_fn(post.nrows(), 1, |i, _| 1.0 - post[(i, 0)]);
    let p_c1_given_b0 = fractional_rate(weighted_sum(outcome, &w0), sum_column(&w0));
    let p_c1_given_b1 = fractional_rate(weighted_sum(outcome, post), sum_column(post));

    ChainParameters {
        p_b1_given_a0,
        p_b1_given_a1,
        p_c1_given_b0,
        p_c1_given_b1,
    }
}

/// Weighted rate with a floored denominator; a stratum with no weight at all
/// gets the neutral probability.
fn fractional_rate(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        floored_ratio(numerator, denominator)
    } else {
        NEUTRAL_PROBABILITY
    }
}

fn pseudo_log_likelihood(data: &ChainDataset, post: &Mat<f64>, params: &ChainParameters) -> f64 {
    (0..data.n_rows())
        .map(|i| {
            let label = post[(i, 0)] != 0.0;
            let p_b1 = params.mediator_rate(TreatmentLevel::from(data.treatment()[i]));
            let p_label = if label { p_b1 } else { 1.0 - p_b1 };
            let p_c1 = params.outcome_rate(label);
            let c = indicator(data.outcome()[i]);
            clipped_ln(p_label)
                + c.mul_add(clipped_ln(p_c1), (1.0 - c) * clipped_ln(1.0 - p_c1))
        })
        .sum()
}

fn parameter_change(before: &ChainParameters, after: &ChainParameters) -> f64 {
    let before = before.entries().map(|(_, value)| value);
    let after = after.entries().map(|(_, value)| value);
    max_abs_diff(&before, &after)
}
