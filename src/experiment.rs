/////////////////////////////////////////////////////////////////////////////////////////////\
//
// End-to-end comparison of chain estimators against the oracle.
//
// Created on: 18 Oct 2026
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Chain experiment
//!
//! Simulates a chain dataset, computes the oracle ATE from its empirical
//! chain conditionals, runs every estimator, masks part of the mediator and
//! recovers the chain parameters by EM. A missing-as-zero plug-in serves as
//! the naive baseline for the masked data.

use comfy_table::{
    Attribute, Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED,
};
use thiserror::Error;
use tracing::info;

use crate::estimators::{Estimator, ate, ate_with, plugin_backdoor_chain};
use crate::input::ChainDataset;
use crate::models::chain::ChainParameters;
use crate::models::em::{EmError, EmOptions, EmReport, fit_chain_missing_mediator};
use crate::preprocess::{ChainDiagnostics, chain_diagnostics};
use crate::simulate::{
    ChainSimulationOptions, SimulationError, StructuralCoefficients, mask_mediator, simulate_chain,
};

/// Errors returned by the experiment driver.
#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error(transparent)]
    Em(#[from] EmError),
}

/// Experiment configuration.
#[derive(Debug, Clone, Copy)]
pub struct ExperimentOptions {
    pub n: usize,
    pub confounded: bool,
    pub seed: u64,
    /// Share of rows whose mediator is masked before EM.
    pub missing_fraction: f64,
    pub em: EmOptions,
    pub coefficients: StructuralCoefficients,
}

impl Default for ExperimentOptions {
    fn default() -> Self {
        Self {
            n: 10_000,
            confounded: true,
            seed: 0,
            missing_fraction: 0.2,
            em: EmOptions {
                max_iter: 200,
                tolerance: 1e-7,
                seed: 0,
            },
            coefficients: StructuralCoefficients::default(),
        }
    }
}

/// One row of the comparison.
#[derive(Debug, Clone)]
pub struct EffectScore {
    pub name: String,
    pub ate: f64,
    /// `ate - oracle_ate`.
    pub bias: f64,
}

/// Full experiment output.
#[derive(Debug, Clone)]
pub struct ChainExperimentReport {
    pub options: ExperimentOptions,
    /// ATE implied by the empirical chain conditionals of the full data.
    pub oracle_ate: f64,
    /// Exact ATE of the structural model.
    pub structural_ate: f64,
    pub scores: Vec<EffectScore>,
    pub em_parameters: ChainParameters,
    pub em_report: EmReport,
    pub diagnostics: ChainDiagnostics,
    pub masked_diagnostics: ChainDiagnostics,
}

impl ChainExperimentReport {
    #[must_use]
    pub fn score(&self, name: &str) -> Option<&EffectScore> {
        self.scores.iter().find(|score| score.name == name)
    }
}

/// Name of the EM row in the report.
pub const EM_SCORE: &str = "em-missing-mediator";
/// Name of the missing-as-zero baseline row.
pub const SENTINEL_SCORE: &str = "missing-as-zero";

/// Run the comparison.
///
/// # Errors
///
/// Returns `ExperimentError` if simulation, masking, or EM fails.
pub fn run_chain_experiment(
    options: ExperimentOptions,
) -> Result<ChainExperimentReport, ExperimentError> {
    let simulated = simulate_chain(ChainSimulationOptions {
        n: options.n,
        seed: options.seed,
        confounded: options.confounded,
        coefficients: options.coefficients,
    })?;
    let data = simulated.data;

    let oracle_ate = ChainParameters::from_empirical(&data).ate();
    let structural_ate = options.coefficients.ate(options.confounded);

    let mut scores = Estimator::ALL
        .into_iter()
        .map(|estimator| score(estimator.id(), ate(estimator, &data), oracle_ate))
        .collect::<Vec<_>>();

    let masked = mask_mediator(&data, options.missing_fraction, options.seed)?;
    let (em_parameters, em_report) = fit_chain_missing_mediator(&masked, options.em)?;
    scores.push(score(EM_SCORE, em_parameters.ate(), oracle_ate));
    scores.push(score(
        SENTINEL_SCORE,
        missing_as_zero_ate(&masked),
        oracle_ate,
    ));

    info!(
        n = options.n,
        confounded = options.confounded,
        oracle_ate,
        structural_ate,
        em_iterations = em_report.iterations,
        "chain experiment finished"
    );

    Ok(ChainExperimentReport {
        options,
        oracle_ate,
        structural_ate,
        scores,
        em_parameters,
        em_report,
        diagnostics: chain_diagnostics(&data),
        masked_diagnostics: chain_diagnostics(&masked),
    })
}

/// Plug-in ATE after replacing every missing mediator with `0`.
#[must_use]
pub fn missing_as_zero_ate(data: &ChainDataset) -> f64 {
    let imputed = data.with_mediator_imputed(false);
    ate_with(plugin_backdoor_chain, &imputed)
}

fn score(name: &str, ate: f64, oracle_ate: f64) -> EffectScore {
    EffectScore {
        name: name.to_owned(),
        ate,
        bias: ate - oracle_ate,
    }
}

/// Render the comparison using `comfy_table`; the estimate closest to the
/// oracle is highlighted.
#[must_use]
pub fn render_experiment_table(report: &ChainExperimentReport) -> String {
    let mut table = make_table(&["estimator", "ate", "bias"]);
    table.add_row(vec![
        Cell::new("oracle").add_attribute(Attribute::Italic),
        Cell::new(format!("{:+.4}", report.oracle_ate)),
        Cell::new(""),
    ]);
    table.add_row(vec![
        Cell::new("structural").add_attribute(Attribute::Italic),
        Cell::new(format!("{:+.4}", report.structural_ate)),
        Cell::new(format!("{:+.4}", report.structural_ate - report.oracle_ate)),
    ]);

    let best = report
        .scores
        .iter()
        .map(|s| s.bias.abs())
        .fold(f64::INFINITY, f64::min);
    for row in &report.scores {
        let is_best = (row.bias.abs() - best).abs() < 1e-12;
        table.add_row(vec![
            Cell::new(&row.name),
            highlight_cell(row.ate, is_best),
            highlight_cell(row.bias, is_best),
        ]);
    }
    table.to_string()
}

/// Render the EM parameter estimates.
#[must_use]
pub fn render_parameter_table(params: &ChainParameters) -> String {
    let mut table = make_table(&["parameter", "value"]);
    for (name, value) in params.entries() {
        table.add_row(vec![Cell::new(name), Cell::new(format!("{value:.4}"))]);
    }
    table.to_string()
}

fn make_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| Cell::new(*h)).collect::<Vec<_>>());
    table
}

fn highlight_cell(value: f64, is_best: bool) -> Cell {
    let cell = Cell::new(format!("{value:+.4}"));
    if is_best {
        cell.fg(Color::Green).add_attribute(Attribute::Bold)
    } else {
        cell
    }
}
