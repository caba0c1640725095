//! Summary counts of a chain dataset before estimation.

use crate::input::ChainDataset;
use crate::utils::usize_to_f64;

/// Row counts and shares for a chain dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainDiagnostics {
    pub n_rows: usize,
    pub n_treated: usize,
    pub n_untreated: usize,
    pub n_mediator_observed: usize,
    pub n_mediator_missing: usize,
    pub n_outcome_positive: usize,
    pub treated_share: f64,
    pub missing_share: f64,
    pub outcome_share: f64,
    /// Treatment/mediator cells with no observed row, as `(a, b)`. These are
    /// the strata where the front-door estimator falls back to `P(C | B)`.
    pub empty_cells: Vec<(bool, bool)>,
}

#[must_use]
pub fn chain_diagnostics(data: &ChainDataset) -> ChainDiagnostics {
    let n_rows = data.n_rows();
    let n_treated = data.treatment().iter().filter(|&&a| a).count();
    let n_mediator_missing = data.n_missing_mediator();
    let n_outcome_positive = data.outcome().iter().filter(|&&c| c).count();

    let mut cell_counts = [[0usize; 2]; 2];
    for record in data.records() {
        if let Some(b) = record.mediator {
            cell_counts[usize::from(record.treatment)][usize::from(b)] += 1;
        }
    }

    let empty_cells = [(false, false), (false, true), (true, false), (true, true)]
        .into_iter()
        .filter(|&(a, b)| cell_counts[usize::from(a)][usize::from(b)] == 0)
        .collect();

    let n = usize_to_f64(n_rows);
    ChainDiagnostics {
        n_rows,
        n_treated,
        n_untreated: n_rows - n_treated,
        n_mediator_observed: n_rows - n_mediator_missing,
        n_mediator_missing,
        n_outcome_positive,
        treated_share: usize_to_f64(n_treated) / n,
        missing_share: usize_to_f64(n_mediator_missing) / n,
        outcome_share: usize_to_f64(n_outcome_positive) / n,
        empty_cells,
    }
}
