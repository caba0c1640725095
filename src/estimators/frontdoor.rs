//! Front-door adjustment through the mediator.

use tracing::debug;

use crate::input::{ChainDataset, TreatmentLevel};
use crate::tables::{Stratum, Variable, stratum_mean, stratum_mean_or};
use crate::utils::NEUTRAL_PROBABILITY;

/// Front-door estimate of `P(C=1 | do(A=a))`:
///
/// `sum_b P(B=b | A=a) * sum_a' P(C=1 | B=b, A=a') P(A=a')`.
///
/// An empty `(b, a')` cell takes the collapsed `P(C=1 | B=b)` in place of
/// `P(C=1 | B=b, A=a')`. This keeps the estimate defined on sparse data but is
/// an approximation, not a general identification formula.
#[must_use]
pub fn frontdoor(data: &ChainDataset, level: TreatmentLevel) -> f64 {
    let p_a1 = stratum_mean_or(data, Variable::Treatment, Stratum::ALL, NEUTRAL_PROBABILITY);
    let p_b1_given_a = stratum_mean_or(
        data,
        Variable::Mediator,
        Stratum::treatment(level),
        NEUTRAL_PROBABILITY,
    );

    let adjusted_b1 = adjusted_outcome_rate(data, true, p_a1);
    let adjusted_b0 = adjusted_outcome_rate(data, false, p_a1);

    adjusted_b1.mul_add(p_b1_given_a, adjusted_b0 * (1.0 - p_b1_given_a))
}

/// `sum_a' P(C=1 | B=b, A=a') P(A=a')`.
fn adjusted_outcome_rate(data: &ChainDataset, mediator: bool, p_a1: f64) -> f64 {
    let collapsed = stratum_mean_or(
        data,
        Variable::Outcome,
        Stratum::mediator(mediator),
        NEUTRAL_PROBABILITY,
    );
    let cell_rate = |level: TreatmentLevel| {
        stratum_mean(data, Variable::Outcome, Stratum::cell(level, mediator)).unwrap_or_else(|| {
            debug!(
                mediator,
                treatment = level.as_u8(),
                collapsed,
                "empty front-door cell, using P(C | B) instead"
            );
            collapsed
        })
    };
    let treated = cell_rate(TreatmentLevel::Treated);
    let untreated = cell_rate(TreatmentLevel::Untreated);
    treated.mul_add(p_a1, untreated * (1.0 - p_a1))
}
