//! Association-based estimators that ignore confounding.

use crate::input::{ChainDataset, TreatmentLevel};
use crate::tables::{Stratum, Variable, stratum_mean_or};
use crate::utils::NEUTRAL_PROBABILITY;

/// Empirical `P(C=1 | A=a)`. Biased whenever `A` and `C` share a cause.
#[must_use]
pub fn naive_associational(data: &ChainDataset, level: TreatmentLevel) -> f64 {
    stratum_mean_or(
        data,
        Variable::Outcome,
        Stratum::treatment(level),
        NEUTRAL_PROBABILITY,
    )
}

/// Chain plug-in `sum_b P(C=1|B=b) P(B=b|A=a)`.
///
/// Identifies the interventional mean only when nothing confounds the
/// mediator-outcome relation; under a shared cause of `A` and `C` the outcome
/// conditionals absorb the confounding through `A`.
#[must_use]
pub fn plugin_backdoor_chain(data: &ChainDataset, level: TreatmentLevel) -> f64 {
    let p_b1 = stratum_mean_or(
        data,
        Variable::Mediator,
        Stratum::treatment(level),
        NEUTRAL_PROBABILITY,
    );
    let p_c1_b1 = stratum_mean_or(
        data,
        Variable::Outcome,
        Stratum::mediator(true),
        NEUTRAL_PROBABILITY,
    );
    let p_c1_b0 = stratum_mean_or(
        data,
        Variable::Outcome,
        Stratum::mediator(false),
        NEUTRAL_PROBABILITY,
    );
    p_c1_b1.mul_add(p_b1, p_c1_b0 * (1.0 - p_b1))
}
