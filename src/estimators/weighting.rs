//! Propensity-weighted estimators without covariates.
//!
//! The propensity is the marginal `e = P(A=1)`, so both estimators reduce to
//! the arm mean of `C` up to floating point. They are kept in their weighted
//! form so the weighting arithmetic itself is exercised.

use faer::Mat;

use crate::input::{ChainDataset, TreatmentLevel};
use crate::tables::{Stratum, Variable, stratum_mean};
use crate::utils::{NEUTRAL_PROBABILITY, indicator, mean_column, sum_column, weighted_sum};

/// Propensity of the requested arm, `e` or `1 - e`; `None` when the arm is empty.
fn arm_propensity(data: &ChainDataset, level: TreatmentLevel) -> Option<f64> {
    let e = mean_column(&data.treatment_column());
    let p = match level {
        TreatmentLevel::Treated => e,
        TreatmentLevel::Untreated => 1.0 - e,
    };
    (p > 0.0).then_some(p)
}

/// IPW estimate `sum_i w_i C_i 1[A_i=a] / sum_i w_i` with
/// `w = A/e` for the treated arm and `w = (1-A)/(1-e)` for the untreated arm.
#[must_use]
pub fn ipw(data: &ChainDataset, level: TreatmentLevel) -> f64 {
    let Some(p_arm) = arm_propensity(data, level) else {
        return NEUTRAL_PROBABILITY;
    };
    let target = level.as_bool();
    let weights = Mat::from_fn(data.n_rows(), 1, |i, _| {
        indicator(data.treatment()[i] == target) / p_arm
    });
    let weighted_outcome = Mat::from_fn(data.n_rows(), 1, |i, _| {
        indicator(data.outcome()[i] && data.treatment()[i] == target)
    });
    weighted_sum(&weighted_outcome, &weights) / sum_column(&weights)
}

/// AIPW without covariates: `mean_i [ 1[A_i=a] (C_i - mu_a) / p_a + mu_a ]`,
/// where `mu_a` is the outcome mean in arm `a` and `p_a` its propensity.
#[must_use]
pub fn aipw_constant_propensity(data: &ChainDataset, level: TreatmentLevel) -> f64 {
    let Some(p_arm) = arm_propensity(data, level) else {
        return NEUTRAL_PROBABILITY;
    };
    let Some(mu) = stratum_mean(data, Variable::Outcome, Stratum::treatment(level)) else {
        return NEUTRAL_PROBABILITY;
    };
    let target = level.as_bool();
    let components = Mat::from_fn(data.n_rows(), 1, |i, _| {
        let residual = indicator(data.outcome()[i]) - mu;
        (indicator(data.treatment()[i] == target) * residual / p_arm) + mu
    });
    mean_column(&components)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimators::naive_associational;
    use approx::assert_relative_eq;

    fn sample() -> ChainDataset {
        ChainDataset::from_binary_columns(
            &[0, 0, 0, 1, 1, 1, 1, 0, 1, 0],
            &[None; 10],
            &[0, 1, 0, 1, 1, 0, 1, 0, 1, 1],
        )
        .expect("valid columns")
    }

    #[test]
    fn ipw_reduces_to_arm_mean_without_covariates() {
        let data = sample();
        for level in TreatmentLevel::ALL {
            assert_relative_eq!(
                ipw(&data, level),
                naive_associational(&data, level),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn aipw_reduces_to_arm_mean_without_covariates() {
        let data = sample();
        assert_relative_eq!(
            aipw_constant_propensity(&data, TreatmentLevel::Treated),
            0.8,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            aipw_constant_propensity(&data, TreatmentLevel::Untreated),
            0.4,
            epsilon = 1e-12
        );
    }

    #[test]
    fn empty_arm_returns_neutral_probability() {
        let data = ChainDataset::from_binary_columns(&[1, 1], &[None, None], &[0, 1])
            .expect("valid columns");
        assert_relative_eq!(ipw(&data, TreatmentLevel::Untreated), NEUTRAL_PROBABILITY);
        assert_relative_eq!(
            aipw_constant_propensity(&data, TreatmentLevel::Untreated),
            NEUTRAL_PROBABILITY
        );
        assert_relative_eq!(ipw(&data, TreatmentLevel::Treated), 0.5, epsilon = 1e-12);
    }
}
