#![forbid(unsafe_code)]

//! # `causal_chain_models`
//!
//! Causal effect estimators for a binary treatment -> mediator -> outcome
//! chain: naive association, chain plug-in, front-door adjustment, IPW and
//! AIPW, an EM routine for a mediator missing at random, and a closed-form
//! oracle for validation.
//!
//! The crate was written for simulation studies of confounded chains, but the
//! estimators only need a binary dataset and can be reused elsewhere.

pub mod estimators;
pub mod experiment;
pub mod inference;
pub mod input;
pub mod models;
pub mod preprocess;
pub mod simulate;
pub mod tables;
pub mod utils;

pub use input::{ChainDataset, ChainRecord, InputError, TreatmentLevel};
pub use preprocess::{ChainDiagnostics, chain_diagnostics};
pub use tables::{Stratum, StratumCount, Variable, stratum_count, stratum_mean, stratum_mean_or};

pub use estimators::{
    EffectEstimate, Estimator, EstimatorFn, EstimatorParseError, aipw_constant_propensity, ate,
    ate_with, estimate_effect, frontdoor, ipw, naive_associational, plugin_backdoor_chain,
};

pub use models::chain::{ChainParameters, ParameterError, true_do_from_dgp_chain};
pub use models::em::{EmError, EmOptions, EmReport, em_chain_missing_b, fit_chain_missing_mediator};

pub use simulate::{
    ChainSimulationOptions, SimulatedChain, SimulationError, StructuralCoefficients,
    logistic_stable, mask_mediator, simulate_chain,
};

pub use inference::{
    AteBootstrapSummary, BootstrapOptions, ConfidenceInterval, InferenceError, bootstrap_ate,
    bootstrap_statistic,
};

pub use experiment::{
    ChainExperimentReport, EffectScore, ExperimentError, ExperimentOptions, missing_as_zero_ate,
    render_experiment_table, render_parameter_table, run_chain_experiment,
};
