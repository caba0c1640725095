//! # Chain simulation
//!
//! Synthetic structural sampler for the `A -> B -> C` chain with an optional
//! binary confounder `U -> {A, C}`, and a masking step that removes the
//! mediator on a uniformly chosen subset of rows. All randomness comes from a
//! seeded `StdRng`, so equal options give equal datasets.
//!
//! The confounder is returned next to the dataset, never inside it.

use num_traits::ToPrimitive;
use rand::prelude::*;
use rand::rngs::StdRng;
use thiserror::Error;

use crate::input::{ChainDataset, InputError, TreatmentLevel};
use crate::utils::{indicator, usize_to_f64};

/// Errors returned by the simulator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error("sample size must be positive")]
    EmptySample,
    #[error("missing fraction must lie in [0, 1], got {0}")]
    InvalidMissingFraction(f64),
    #[error(transparent)]
    Input(#[from] InputError),
}

/// Logit-scale coefficients of the structural model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructuralCoefficients {
    pub treatment_intercept: f64,
    pub treatment_on_confounder: f64,
    pub mediator_intercept: f64,
    pub mediator_on_treatment: f64,
    pub outcome_intercept: f64,
    pub outcome_on_mediator: f64,
    pub outcome_on_confounder: f64,
    /// `P(U = 1)` when confounded.
    pub confounder_rate: f64,
}

impl Default for StructuralCoefficients {
    fn default() -> Self {
        Self {
            treatment_intercept: -0.3,
            treatment_on_confounder: 1.2,
            mediator_intercept: -0.2,
            mediator_on_treatment: 1.5,
            outcome_intercept: -0.1,
            outcome_on_mediator: 1.4,
            outcome_on_confounder: 1.0,
            confounder_rate: 0.5,
        }
    }
}

impl StructuralCoefficients {
    #[must_use]
    pub fn treatment_probability(&self, confounder: bool) -> f64 {
        logistic_stable(
            self.treatment_on_confounder
                .mul_add(indicator(confounder), self.treatment_intercept),
        )
    }

    #[must_use]
    pub fn mediator_probability(&self, treatment: bool) -> f64 {
        logistic_stable(
            self.mediator_on_treatment
                .mul_add(indicator(treatment), self.mediator_intercept),
        )
    }

    #[must_use]
    pub fn outcome_probability(&self, mediator: bool, confounder: bool, confounded: bool) -> f64 {
        let confounding = if confounded {
            self.outcome_on_confounder * indicator(confounder)
        } else {
            0.0
        };
        logistic_stable(
            self.outcome_on_mediator
                .mul_add(indicator(mediator), self.outcome_intercept)
                + confounding,
        )
    }

    /// Exact structural `P(C=1 | do(A=a))`, marginalizing the mediator and,
    /// when confounded, the confounder.
    #[must_use]
    pub fn interventional_mean(&self, level: TreatmentLevel, confounded: bool) -> f64 {
        let p_b1 = self.mediator_probability(level.as_bool());
        let confounder_states = if confounded {
            [
                (false, 1.0 - self.confounder_rate),
                (true, self.confounder_rate),
            ]
        } else {
            [(false, 1.0), (true, 0.0)]
        };
        confounder_states
            .iter()
            .map(|&(u, p_u)| {
                let c_b1 = self.outcome_probability(true, u, confounded);
                let c_b0 = self.outcome_probability(false, u, confounded);
                p_u * c_b1.mul_add(p_b1, c_b0 * (1.0 - p_b1))
            })
            .sum()
    }

    /// Exact structural ATE.
    #[must_use]
    pub fn ate(&self, confounded: bool) -> f64 {
        self.interventional_mean(TreatmentLevel::Treated, confounded)
            - self.interventional_mean(TreatmentLevel::Untreated, confounded)
    }
}

/// Simulation schedule.
#[derive(Debug, Clone, Copy)]
pub struct ChainSimulationOptions {
    pub n: usize,
    pub seed: u64,
    /// Draw `U` and let it affect both `A` and `C`.
    pub confounded: bool,
    pub coefficients: StructuralCoefficients,
}

impl Default for ChainSimulationOptions {
    fn default() -> Self {
        Self {
            n: 5_000,
            seed: 0,
            confounded: false,
            coefficients: StructuralCoefficients::default(),
        }
    }
}

/// Simulated dataset plus the latent confounder column.
#[derive(Debug, Clone)]
pub struct SimulatedChain {
    pub data: ChainDataset,
    /// `Some` only when the simulation was confounded.
    pub confounder: Option<Vec<bool>>,
}

/// Stable logistic transform.
#[must_use]
pub fn logistic_stable(value: f64) -> f64 {
    if value >= 0.0 {
        let z = (-value).exp();
        1.0 / (1.0 + z)
    } else {
        let z = value.exp();
        z / (1.0 + z)
    }
}

fn bernoulli(rng: &mut StdRng, probability: f64) -> bool {
    rng.random::<f64>() < probability
}

/// Draw a chain dataset from the structural model.
///
/// # Errors
///
/// Returns `SimulationError::EmptySample` if `options.n` is zero.
pub fn simulate_chain(options: ChainSimulationOptions) -> Result<SimulatedChain, SimulationError> {
    if options.n == 0 {
        return Err(SimulationError::EmptySample);
    }
    let coefficients = options.coefficients;
    let mut rng = StdRng::seed_from_u64(options.seed);

    let mut confounder = Vec::with_capacity(options.n);
    let mut treatment = Vec::with_capacity(options.n);
    let mut mediator = Vec::with_capacity(options.n);
    let mut outcome = Vec::with_capacity(options.n);

    for _ in 0..options.n {
        let u = options.confounded && bernoulli(&mut rng, coefficients.confounder_rate);
        let a = bernoulli(&mut rng, coefficients.treatment_probability(u));
        let b = bernoulli(&mut rng, coefficients.mediator_probability(a));
        let c = bernoulli(
            &mut rng,
            coefficients.outcome_probability(b, u, options.confounded),
        );
        confounder.push(u);
        treatment.push(a);
        mediator.push(Some(b));
        outcome.push(c);
    }

    Ok(SimulatedChain {
        data: ChainDataset::new(treatment, mediator, outcome)?,
        confounder: options.confounded.then_some(confounder),
    })
}

/// Remove the mediator on `floor(frac_missing * n)` rows drawn without
/// replacement. Missingness is independent of every variable, hence MAR.
///
/// # Errors
///
/// Returns `SimulationError::InvalidMissingFraction` if the fraction is
/// outside `[0, 1]`.
pub fn mask_mediator(
    data: &ChainDataset,
    frac_missing: f64,
    seed: u64,
) -> Result<ChainDataset, SimulationError> {
    if !(0.0..=1.0).contains(&frac_missing) {
        return Err(SimulationError::InvalidMissingFraction(frac_missing));
    }
    let n = data.n_rows();
    let target = (frac_missing * usize_to_f64(n)).floor();
    let count = target.to_usize().unwrap_or(0).min(n);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = (0..n).collect::<Vec<_>>();
    rows.shuffle(&mut rng);
    rows.truncate(count);

    Ok(data.with_mediator_masked(&rows)?)
}
