//! # Effect estimators
//!
//! Five strategies for `P(C=1 | do(A=a))` from a chain dataset, selectable by
//! identifier, and the ATE driver that differences any of them across the two
//! treatment levels. Every estimator is a pure function of an immutable
//! dataset and never reads the latent confounder.
//!
//! ```
//! use causal_chain_models::{ChainDataset, Estimator, ate};
//!
//! let data = ChainDataset::from_binary_columns(
//!     &[0, 0, 1, 1],
//!     &[Some(0), Some(1), Some(1), Some(1)],
//!     &[0, 1, 1, 1],
//! )
//! .expect("binary columns");
//!
//! let naive: Estimator = "naive".parse().expect("known identifier");
//! assert!((ate(naive, &data) - 0.5).abs() < 1e-12);
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::input::{ChainDataset, TreatmentLevel};
use crate::utils::floored_ratio;

pub mod association;
pub mod frontdoor;
pub mod weighting;

pub use association::{naive_associational, plugin_backdoor_chain};
pub use frontdoor::frontdoor;
pub use weighting::{aipw_constant_propensity, ipw};

/// Common estimator signature.
pub type EstimatorFn = fn(&ChainDataset, TreatmentLevel) -> f64;

/// Unknown estimator identifier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown estimator `{0}`; expected one of naive, plugin-backdoor-chain, frontdoor, ipw, aipw-constant-propensity")]
pub struct EstimatorParseError(pub String);

/// Selectable estimation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Estimator {
    /// `P(C=1 | A=a)`.
    Naive,
    /// `sum_b P(C=1|B=b) P(B=b|A=a)`.
    PluginBackdoorChain,
    /// Front-door adjustment through `B`.
    FrontDoor,
    /// Inverse probability weighting with marginal propensity.
    Ipw,
    /// Augmented IPW with marginal propensity.
    AipwConstantPropensity,
}

impl Estimator {
    pub const ALL: [Self; 5] = [
        Self::Naive,
        Self::PluginBackdoorChain,
        Self::FrontDoor,
        Self::Ipw,
        Self::AipwConstantPropensity,
    ];

    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Naive => "naive",
            Self::PluginBackdoorChain => "plugin-backdoor-chain",
            Self::FrontDoor => "frontdoor",
            Self::Ipw => "ipw",
            Self::AipwConstantPropensity => "aipw-constant-propensity",
        }
    }

    #[must_use]
    pub fn function(self) -> EstimatorFn {
        match self {
            Self::Naive => naive_associational,
            Self::PluginBackdoorChain => plugin_backdoor_chain,
            Self::FrontDoor => frontdoor,
            Self::Ipw => ipw,
            Self::AipwConstantPropensity => aipw_constant_propensity,
        }
    }

    /// `P(C=1 | do(A=a))` under this strategy.
    #[must_use]
    pub fn interventional_mean(self, data: &ChainDataset, level: TreatmentLevel) -> f64 {
        (self.function())(data, level)
    }
}

impl fmt::Display for Estimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.id())
    }
}

impl FromStr for Estimator {
    type Err = EstimatorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|estimator| estimator.id() == s)
            .ok_or_else(|| EstimatorParseError(s.to_owned()))
    }
}

/// Interventional means and contrasts for one estimator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectEstimate {
    pub estimator: Estimator,
    pub mean_treated: f64,
    pub mean_untreated: f64,
    /// Risk difference, the ATE.
    pub additive_effect: f64,
    pub risk_ratio: f64,
    pub odds_ratio: f64,
}

/// `estimator(data, 1) - estimator(data, 0)` for any conforming function.
pub fn ate_with<F>(estimator: F, data: &ChainDataset) -> f64
where
    F: Fn(&ChainDataset, TreatmentLevel) -> f64,
{
    estimator(data, TreatmentLevel::Treated) - estimator(data, TreatmentLevel::Untreated)
}

/// ATE of a named estimator.
#[must_use]
pub fn ate(estimator: Estimator, data: &ChainDataset) -> f64 {
    ate_with(estimator.function(), data)
}

#[must_use]
pub fn estimate_effect(estimator: Estimator, data: &ChainDataset) -> EffectEstimate {
    let mean_treated = estimator.interventional_mean(data, TreatmentLevel::Treated);
    let mean_untreated = estimator.interventional_mean(data, TreatmentLevel::Untreated);
    let odds_treated = floored_ratio(mean_treated, 1.0 - mean_treated);
    let odds_untreated = floored_ratio(mean_untreated, 1.0 - mean_untreated);
    EffectEstimate {
        estimator,
        mean_treated,
        mean_untreated,
        additive_effect: mean_treated - mean_untreated,
        risk_ratio: floored_ratio(mean_treated, mean_untreated),
        odds_ratio: floored_ratio(odds_treated, odds_untreated),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample() -> ChainDataset {
        ChainDataset::from_binary_columns(
            &[0, 0, 0, 0, 1, 1, 1, 1],
            &[Some(0), Some(0), Some(1), Some(0), Some(1), Some(1), Some(0), Some(1)],
            &[0, 1, 1, 0, 1, 1, 1, 0],
        )
        .expect("valid columns")
    }

    #[test]
    fn identifiers_round_trip_through_from_str() {
        for estimator in Estimator::ALL {
            let parsed: Estimator = estimator.id().parse().expect("known identifier");
            assert_eq!(parsed, estimator);
            assert_eq!(estimator.to_string(), estimator.id());
        }
        let err = "backdoor".parse::<Estimator>().expect_err("unknown identifier");
        assert_eq!(err, EstimatorParseError("backdoor".to_owned()));
    }

    #[test]
    fn ate_differences_the_two_levels() {
        let data = sample();
        for estimator in Estimator::ALL {
            let expected = estimator.interventional_mean(&data, TreatmentLevel::Treated)
                - estimator.interventional_mean(&data, TreatmentLevel::Untreated);
            assert_relative_eq!(ate(estimator, &data), expected);
        }
    }

    #[test]
    fn ate_with_accepts_closures() {
        let data = sample();
        let constant = |_: &ChainDataset, level: TreatmentLevel| f64::from(level.as_u8());
        assert_relative_eq!(ate_with(constant, &data), 1.0);
    }

    #[test]
    fn effect_estimate_reports_contrasts() {
        let data = sample();
        let effect = estimate_effect(Estimator::Naive, &data);
        assert_relative_eq!(effect.mean_treated, 0.75);
        assert_relative_eq!(effect.mean_untreated, 0.5);
        assert_relative_eq!(effect.additive_effect, 0.25);
        assert_relative_eq!(effect.risk_ratio, 1.5, epsilon = 1e-12);
        assert_relative_eq!(effect.odds_ratio, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn repeated_calls_are_bit_identical() {
        let data = sample();
        for estimator in Estimator::ALL {
            for level in TreatmentLevel::ALL {
                let first = estimator.interventional_mean(&data, level);
                let second = estimator.interventional_mean(&data, level);
                assert_eq!(first.to_bits(), second.to_bits());
            }
        }
    }
}
