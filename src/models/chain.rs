/////////////////////////////////////////////////////////////////////////////////////////////\
//
// Chain parameters and the closed-form interventional oracle.
//
// Created on: 18 Oct 2026
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Chain parameters
//!
//! The four conditionals `P(B=1|A=0)`, `P(B=1|A=1)`, `P(C=1|B=0)` and
//! `P(C=1|B=1)` fully parameterize the `A -> B -> C` chain without a direct
//! `A -> C` edge. Given them, `P(C=1 | do(A=a))` is a convex combination of the
//! outcome conditionals and is used as the validation reference.

use thiserror::Error;

use crate::input::{ChainDataset, TreatmentLevel};
use crate::tables::{Stratum, Variable, stratum_mean_or};
use crate::utils::NEUTRAL_PROBABILITY;

/// Errors returned by parameter validation.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ParameterError {
    #[error("parameter {name} = {value} must be a finite probability in [0, 1]")]
    OutOfRange { name: &'static str, value: f64 },
}

/// Minimal parameterization of the chain model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainParameters {
    /// `P(B=1 | A=0)`.
    pub p_b1_given_a0: f64,
    /// `P(B=1 | A=1)`.
    pub p_b1_given_a1: f64,
    /// `P(C=1 | B=0)`.
    pub p_c1_given_b0: f64,
    /// `P(C=1 | B=1)`.
    pub p_c1_given_b1: f64,
}

impl ChainParameters {
    /// # Errors
    ///
    /// Returns `ParameterError` if any value is not a finite probability.
    pub fn new(
        p_b1_given_a0: f64,
        p_b1_given_a1: f64,
        p_c1_given_b0: f64,
        p_c1_given_b1: f64,
    ) -> Result<Self, ParameterError> {
        let params = Self {
            p_b1_given_a0,
            p_b1_given_a1,
            p_c1_given_b0,
            p_c1_given_b1,
        };
        params.validate()?;
        Ok(params)
    }

    /// Complete-case empirical conditionals, `0.5` for any empty stratum.
    #[must_use]
    pub fn from_empirical(data: &ChainDataset) -> Self {
        let mediator_rate = |level| {
            stratum_mean_or(
                data,
                Variable::Mediator,
                Stratum::treatment(level),
                NEUTRAL_PROBABILITY,
            )
        };
        let outcome_rate = |b| {
            stratum_mean_or(
                data,
                Variable::Outcome,
                Stratum::mediator(b),
                NEUTRAL_PROBABILITY,
            )
        };
        Self {
            p_b1_given_a0: mediator_rate(TreatmentLevel::Untreated),
            p_b1_given_a1: mediator_rate(TreatmentLevel::Treated),
            p_c1_given_b0: outcome_rate(false),
            p_c1_given_b1: outcome_rate(true),
        }
    }

    /// Named view, keyed the way reports print the parameters.
    #[must_use]
    pub const fn entries(&self) -> [(&'static str, f64); 4] {
        [
            ("p_b1_given_a0", self.p_b1_given_a0),
            ("p_b1_given_a1", self.p_b1_given_a1),
            ("p_c1_given_b0", self.p_c1_given_b0),
            ("p_c1_given_b1", self.p_c1_given_b1),
        ]
    }

    /// # Errors
    ///
    /// Returns `ParameterError::OutOfRange` for the first invalid entry.
    pub fn validate(&self) -> Result<(), ParameterError> {
        for (name, value) in self.entries() {
            if !(value.is_finite() && (0.0..=1.0).contains(&value)) {
                return Err(ParameterError::OutOfRange { name, value });
            }
        }
        Ok(())
    }

    #[must_use]
    pub const fn mediator_rate(&self, level: TreatmentLevel) -> f64 {
        match level {
            TreatmentLevel::Untreated => self.p_b1_given_a0,
            TreatmentLevel::Treated => self.p_b1_given_a1,
        }
    }

    #[must_use]
    pub const fn outcome_rate(&self, mediator: bool) -> f64 {
        if mediator {
            self.p_c1_given_b1
        } else {
            self.p_c1_given_b0
        }
    }

    /// `P(C=1 | do(A=a))` implied by the parameters.
    #[must_use]
    pub fn interventional_mean(&self, level: TreatmentLevel) -> f64 {
        let p_b1 = self.mediator_rate(level);
        self.p_c1_given_b1
            .mul_add(p_b1, self.p_c1_given_b0 * (1.0 - p_b1))
    }

    /// Risk difference between the treated and untreated interventions.
    #[must_use]
    pub fn ate(&self) -> f64 {
        self.interventional_mean(TreatmentLevel::Treated)
            - self.interventional_mean(TreatmentLevel::Untreated)
    }
}

/// Closed-form `P(C=1 | do(A=a))` for known chain parameters.
#[must_use]
pub fn true_do_from_dgp_chain(params: &ChainParameters, level: TreatmentLevel) -> f64 {
    params.interventional_mean(level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn new_rejects_out_of_range_values() {
        let err = ChainParameters::new(0.2, 1.5, 0.3, 0.4).expect_err("1.5 is not a probability");
        assert_eq!(
            err,
            ParameterError::OutOfRange {
                name: "p_b1_given_a1",
                value: 1.5
            }
        );
        assert!(ChainParameters::new(f64::NAN, 0.5, 0.5, 0.5).is_err());
    }

    #[test]
    fn oracle_is_convex_combination() {
        let grid = [0.0, 0.1, 0.5, 0.9, 1.0];
        for &b0 in &grid {
            for &b1 in &grid {
                for &c0 in &grid {
                    for &c1 in &grid {
                        let params = ChainParameters::new(b0, b1, c0, c1).expect("valid");
                        for level in TreatmentLevel::ALL {
                            let value = true_do_from_dgp_chain(&params, level);
                            assert!((0.0..=1.0).contains(&value));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn oracle_matches_hand_computation() {
        let params = ChainParameters::new(0.2, 0.7, 0.1, 0.6).expect("valid");
        assert_relative_eq!(
            params.interventional_mean(TreatmentLevel::Treated),
            0.6f64.mul_add(0.7, 0.1 * 0.3),
            epsilon = 1e-12
        );
        assert_relative_eq!(params.ate(), 0.5 * 0.5, epsilon = 1e-12);
    }

    #[test]
    fn empirical_parameters_use_complete_cases_and_neutral_default() {
        let data = ChainDataset::from_binary_columns(
            &[0, 0, 1, 1],
            &[Some(0), Some(0), Some(0), None],
            &[1, 0, 1, 1],
        )
        .expect("valid columns");
        let params = ChainParameters::from_empirical(&data);
        assert_relative_eq!(params.p_b1_given_a0, 0.0);
        assert_relative_eq!(params.p_b1_given_a1, 0.0);
        assert_relative_eq!(params.p_c1_given_b0, 2.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(params.p_c1_given_b1, NEUTRAL_PROBABILITY);
    }
}
