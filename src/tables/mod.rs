//! # Probability tables
//!
//! Empirical conditional means of one binary variable restricted to a stratum
//! of the chain dataset. Rows whose target value is missing are skipped, and
//! rows with a missing mediator never match a stratum that fixes the mediator.
//! An empty stratum yields `None`, or the caller's default through
//! [`stratum_mean_or`].

use crate::input::{ChainDataset, ChainRecord, TreatmentLevel};
use crate::utils::{indicator, usize_to_f64};

/// Column whose mean is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variable {
    Treatment,
    Mediator,
    Outcome,
}

impl Variable {
    fn value(self, record: &ChainRecord) -> Option<bool> {
        match self {
            Self::Treatment => Some(record.treatment),
            Self::Mediator => record.mediator,
            Self::Outcome => Some(record.outcome),
        }
    }
}

/// Row filter on treatment and mediator values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stratum {
    pub treatment: Option<bool>,
    pub mediator: Option<bool>,
}

impl Stratum {
    /// Every row.
    pub const ALL: Self = Self {
        treatment: None,
        mediator: None,
    };

    #[must_use]
    pub const fn treatment(level: TreatmentLevel) -> Self {
        Self {
            treatment: Some(level.as_bool()),
            mediator: None,
        }
    }

    #[must_use]
    pub const fn mediator(value: bool) -> Self {
        Self {
            treatment: None,
            mediator: Some(value),
        }
    }

    #[must_use]
    pub const fn cell(level: TreatmentLevel, mediator: bool) -> Self {
        Self {
            treatment: Some(level.as_bool()),
            mediator: Some(mediator),
        }
    }

    #[must_use]
    pub fn contains(&self, record: &ChainRecord) -> bool {
        let treatment_ok = self.treatment.is_none_or(|a| record.treatment == a);
        let mediator_ok = self
            .mediator
            .is_none_or(|b| record.mediator == Some(b));
        treatment_ok && mediator_ok
    }
}

/// Numerator and row count behind a stratum mean.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StratumCount {
    pub successes: f64,
    pub rows: usize,
}

impl StratumCount {
    #[must_use]
    pub fn mean(self) -> Option<f64> {
        (self.rows > 0).then(|| self.successes / usize_to_f64(self.rows))
    }
}

#[must_use]
pub fn stratum_count(data: &ChainDataset, target: Variable, stratum: Stratum) -> StratumCount {
    data.records()
        .filter(|record| stratum.contains(record))
        .filter_map(|record| target.value(&record))
        .fold(StratumCount::default(), |acc, value| StratumCount {
            successes: acc.successes + indicator(value),
            rows: acc.rows + 1,
        })
}

/// Empirical `P(target = 1 | stratum)`, or `None` when no row qualifies.
#[must_use]
pub fn stratum_mean(data: &ChainDataset, target: Variable, stratum: Stratum) -> Option<f64> {
    stratum_count(data, target, stratum).mean()
}

/// Empirical `P(target = 1 | stratum)` with `default` for an empty stratum.
#[must_use]
pub fn stratum_mean_or(
    data: &ChainDataset,
    target: Variable,
    stratum: Stratum,
    default: f64,
) -> f64 {
    stratum_mean(data, target, stratum).unwrap_or(default)
}
