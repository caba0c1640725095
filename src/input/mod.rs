//! # Chain datasets
//!
//! Defines a validated, column-oriented container for a binary treatment `A`,
//! a binary mediator `B` that may be missing, and a binary outcome `C`.
//! The latent confounder is never part of this container.
//!
//! # Examples
//!
//! ```
//! use causal_chain_models::ChainDataset;
//!
//! let data = ChainDataset::from_binary_columns(
//!     &[0, 1, 1, 0],
//!     &[Some(0), Some(1), None, Some(1)],
//!     &[0, 1, 1, 1],
//! )
//! .expect("binary columns");
//!
//! assert_eq!(data.n_rows(), 4);
//! assert_eq!(data.n_missing_mediator(), 1);
//! ```
//!
//! ```
//! use causal_chain_models::ChainDataset;
//!
//! let data = ChainDataset::from_float_columns(&[0.0, 2.0], &[1.0, f64::NAN], &[1.0, 0.0]);
//!
//! assert!(data.is_err());
//! ```

use faer::Mat;
use thiserror::Error;

use crate::utils::indicator;

/// Errors returned when building a chain dataset.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InputError {
    #[error("dataset must contain at least one row")]
    Empty,
    #[error("column lengths differ: treatment {treatment}, mediator {mediator}, outcome {outcome}")]
    LengthMismatch {
        treatment: usize,
        mediator: usize,
        outcome: usize,
    },
    #[error("column {column} row {row} holds non-binary value {value}")]
    NonBinary {
        column: &'static str,
        row: usize,
        value: f64,
    },
    #[error("column {column} row {row} is missing but the column must be fully observed")]
    UnexpectedMissing { column: &'static str, row: usize },
    #[error("row index {index} out of range for {rows} rows")]
    RowOutOfRange { index: usize, rows: usize },
}

/// Treatment level `a` in `P(C=1 | do(A=a))`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TreatmentLevel {
    Untreated,
    Treated,
}

impl TreatmentLevel {
    pub const ALL: [Self; 2] = [Self::Untreated, Self::Treated];

    #[must_use]
    pub const fn as_bool(self) -> bool {
        matches!(self, Self::Treated)
    }

    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Untreated => 0,
            Self::Treated => 1,
        }
    }
}

impl From<bool> for TreatmentLevel {
    fn from(value: bool) -> Self {
        if value { Self::Treated } else { Self::Untreated }
    }
}

impl TryFrom<u8> for TreatmentLevel {
    type Error = InputError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Untreated),
            1 => Ok(Self::Treated),
            other => Err(InputError::NonBinary {
                column: "treatment level",
                row: 0,
                value: f64::from(other),
            }),
        }
    }
}

/// One unit of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainRecord {
    pub treatment: bool,
    pub mediator: Option<bool>,
    pub outcome: bool,
}

/// Immutable columnar dataset. Construction guarantees at least one row and
/// equal column lengths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainDataset {
    treatment: Vec<bool>,
    mediator: Vec<Option<bool>>,
    outcome: Vec<bool>,
}

impl ChainDataset {
    /// # Errors
    ///
    /// Returns `InputError` if the dataset is empty or the columns differ in length.
    pub fn new(
        treatment: Vec<bool>,
        mediator: Vec<Option<bool>>,
        outcome: Vec<bool>,
    ) -> Result<Self, InputError> {
        if treatment.len() != mediator.len() || treatment.len() != outcome.len() {
            return Err(InputError::LengthMismatch {
                treatment: treatment.len(),
                mediator: mediator.len(),
                outcome: outcome.len(),
            });
        }
        if treatment.is_empty() {
            return Err(InputError::Empty);
        }
        Ok(Self {
            treatment,
            mediator,
            outcome,
        })
    }

    /// Build from 0/1 integer columns; `None` marks a missing mediator.
    ///
    /// # Errors
    ///
    /// Returns `InputError` on non-binary values, empty input, or length mismatch.
    pub fn from_binary_columns(
        treatment: &[u8],
        mediator: &[Option<u8>],
        outcome: &[u8],
    ) -> Result<Self, InputError> {
        let treatment = binary_column("treatment", treatment.iter().map(|v| f64::from(*v)))?;
        let outcome = binary_column("outcome", outcome.iter().map(|v| f64::from(*v)))?;
        let mediator = mediator
            .iter()
            .enumerate()
            .map(|(row, value)| {
                value
                    .map(|v| binary_value("mediator", row, f64::from(v)))
                    .transpose()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(treatment, mediator, outcome)
    }

    /// Build from float columns in which `NaN` marks a missing mediator.
    ///
    /// # Errors
    ///
    /// Returns `InputError` on non-binary values, `NaN` outside the mediator
    /// column, empty input, or length mismatch.
    pub fn from_float_columns(
        treatment: &[f64],
        mediator: &[f64],
        outcome: &[f64],
    ) -> Result<Self, InputError> {
        let treatment = binary_column("treatment", treatment.iter().copied())?;
        let outcome = binary_column("outcome", outcome.iter().copied())?;
        let mediator = mediator
            .iter()
            .copied()
            .enumerate()
            .map(|(row, value)| {
                if value.is_nan() {
                    Ok(None)
                } else {
                    binary_value("mediator", row, value).map(Some)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(treatment, mediator, outcome)
    }

    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.treatment.len()
    }

    #[must_use]
    pub fn treatment(&self) -> &[bool] {
        &self.treatment
    }

    #[must_use]
    pub fn mediator(&self) -> &[Option<bool>] {
        &self.mediator
    }

    #[must_use]
    pub fn outcome(&self) -> &[bool] {
        &self.outcome
    }

    #[must_use]
    pub fn record(&self, row: usize) -> Option<ChainRecord> {
        Some(ChainRecord {
            treatment: *self.treatment.get(row)?,
            mediator: *self.mediator.get(row)?,
            outcome: *self.outcome.get(row)?,
        })
    }

    pub fn records(&self) -> impl Iterator<Item = ChainRecord> + '_ {
        self.treatment
            .iter()
            .zip(&self.mediator)
            .zip(&self.outcome)
            .map(|((&treatment, &mediator), &outcome)| ChainRecord {
                treatment,
                mediator,
                outcome,
            })
    }

    /// Observed/missing indicator for the mediator column.
    #[must_use]
    pub fn mediator_observed_mask(&self) -> Vec<bool> {
        self.mediator.iter().map(Option::is_some).collect()
    }

    #[must_use]
    pub fn n_missing_mediator(&self) -> usize {
        self.mediator.iter().filter(|b| b.is_none()).count()
    }

    #[must_use]
    pub fn has_missing_mediator(&self) -> bool {
        self.mediator.iter().any(Option::is_none)
    }

    /// Treatment column as an `n x 1` 0/1 vector.
    #[must_use]
    pub fn treatment_column(&self) -> Mat<f64> {
        Mat::from_fn(self.n_rows(), 1, |i, _| indicator(self.treatment[i]))
    }

    /// Outcome column as an `n x 1` 0/1 vector.
    #[must_use]
    pub fn outcome_column(&self) -> Mat<f64> {
        Mat::from_fn(self.n_rows(), 1, |i, _| indicator(self.outcome[i]))
    }

    /// New dataset built from the given rows, repeats allowed.
    ///
    /// # Errors
    ///
    /// Returns `InputError` if `indices` is empty or any index is out of range.
    pub fn select_rows(&self, indices: &[usize]) -> Result<Self, InputError> {
        let rows = self.n_rows();
        if let Some(&index) = indices.iter().find(|&&index| index >= rows) {
            return Err(InputError::RowOutOfRange { index, rows });
        }
        Self::new(
            indices.iter().map(|&i| self.treatment[i]).collect(),
            indices.iter().map(|&i| self.mediator[i]).collect(),
            indices.iter().map(|&i| self.outcome[i]).collect(),
        )
    }

    /// Copy with every missing mediator replaced by `value`.
    #[must_use]
    pub fn with_mediator_imputed(&self, value: bool) -> Self {
        Self {
            treatment: self.treatment.clone(),
            mediator: self
                .mediator
                .iter()
                .map(|b| Some(b.unwrap_or(value)))
                .collect(),
            outcome: self.outcome.clone(),
        }
    }

    /// Copy with the mediator removed on the given rows.
    ///
    /// # Errors
    ///
    /// Returns `InputError::RowOutOfRange` if any index is out of range.
    pub fn with_mediator_masked(&self, rows_to_mask: &[usize]) -> Result<Self, InputError> {
        let rows = self.n_rows();
        let mut mediator = self.mediator.clone();
        for &index in rows_to_mask {
            let slot = mediator
                .get_mut(index)
                .ok_or(InputError::RowOutOfRange { index, rows })?;
            *slot = None;
        }
        Ok(Self {
            treatment: self.treatment.clone(),
            mediator,
            outcome: self.outcome.clone(),
        })
    }
}

fn binary_value(column: &'static str, row: usize, value: f64) -> Result<bool, InputError> {
    if value == 0.0 {
        Ok(false)
    } else if value == 1.0 {
        Ok(true)
    } else if value.is_nan() {
        Err(InputError::UnexpectedMissing { column, row })
    } else {
        Err(InputError::NonBinary { column, row, value })
    }
}

fn binary_column(
    column: &'static str,
    values: impl Iterator<Item = f64>,
) -> Result<Vec<bool>, InputError> {
    values
        .enumerate()
        .map(|(row, value)| binary_value(column, row, value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ChainDataset {
        ChainDataset::from_binary_columns(
            &[0, 1, 1, 0],
            &[Some(0), Some(1), None, Some(1)],
            &[0, 1, 1, 1],
        )
        .expect("valid columns")
    }

    #[test]
    fn new_rejects_empty_dataset() {
        let err = ChainDataset::new(Vec::new(), Vec::new(), Vec::new())
            .expect_err("empty dataset should fail");
        assert_eq!(err, InputError::Empty);
    }

    #[test]
    fn new_rejects_length_mismatch() {
        let err = ChainDataset::new(vec![true], vec![None, None], vec![false])
            .expect_err("mismatched columns should fail");
        assert_eq!(
            err,
            InputError::LengthMismatch {
                treatment: 1,
                mediator: 2,
                outcome: 1
            }
        );
    }

    #[test]
    fn binary_columns_reject_values_outside_zero_one() {
        let err = ChainDataset::from_binary_columns(&[0, 2], &[Some(0), Some(1)], &[0, 1])
            .expect_err("non-binary treatment should fail");
        assert_eq!(
            err,
            InputError::NonBinary {
                column: "treatment",
                row: 1,
                value: 2.0
            }
        );
    }

    #[test]
    fn float_columns_map_nan_mediator_to_missing() {
        let data = ChainDataset::from_float_columns(
            &[0.0, 1.0, 1.0],
            &[f64::NAN, 1.0, 0.0],
            &[1.0, 0.0, 1.0],
        )
        .expect("valid columns");
        assert_eq!(data.mediator(), &[None, Some(true), Some(false)]);
    }

    #[test]
    fn float_columns_reject_missing_outcome() {
        let err = ChainDataset::from_float_columns(&[0.0], &[1.0], &[f64::NAN])
            .expect_err("missing outcome should fail");
        assert_eq!(
            err,
            InputError::UnexpectedMissing {
                column: "outcome",
                row: 0
            }
        );
    }

    #[test]
    fn float_columns_reject_fractional_mediator() {
        let err = ChainDataset::from_float_columns(&[0.0], &[0.5], &[1.0])
            .expect_err("fractional mediator should fail");
        assert!(matches!(err, InputError::NonBinary { column: "mediator", .. }));
    }

    #[test]
    fn mask_and_counts_track_missing_mediator() {
        let data = sample();
        assert_eq!(data.mediator_observed_mask(), vec![true, true, false, true]);
        assert_eq!(data.n_missing_mediator(), 1);
        assert!(data.has_missing_mediator());
    }

    #[test]
    fn select_rows_allows_repeats_and_rejects_out_of_range() {
        let data = sample();
        let resampled = data.select_rows(&[1, 1, 3]).expect("valid indices");
        assert_eq!(resampled.n_rows(), 3);
        assert_eq!(resampled.treatment(), &[true, true, false]);

        let err = data.select_rows(&[0, 9]).expect_err("index 9 is out of range");
        assert_eq!(err, InputError::RowOutOfRange { index: 9, rows: 4 });
    }

    #[test]
    fn imputation_fills_only_missing_rows() {
        let imputed = sample().with_mediator_imputed(false);
        assert!(!imputed.has_missing_mediator());
        assert_eq!(imputed.mediator()[1], Some(true));
        assert_eq!(imputed.mediator()[2], Some(false));
    }

    #[test]
    fn masking_removes_selected_mediators() {
        let masked = sample().with_mediator_masked(&[0, 1]).expect("valid rows");
        assert_eq!(masked.n_missing_mediator(), 3);
        assert_eq!(masked.outcome(), sample().outcome());
    }

    #[test]
    fn treatment_level_conversions() {
        assert_eq!(TreatmentLevel::try_from(1u8), Ok(TreatmentLevel::Treated));
        assert!(TreatmentLevel::try_from(3u8).is_err());
        assert_eq!(TreatmentLevel::from(false), TreatmentLevel::Untreated);
        assert_eq!(TreatmentLevel::Treated.as_u8(), 1);
    }

    #[test]
    fn columns_export_as_indicator_vectors() {
        let data = sample();
        let treatment = data.treatment_column();
        let outcome = data.outcome_column();
        assert_eq!(treatment.nrows(), 4);
        assert!((treatment[(1, 0)] - 1.0).abs() < 1e-12);
        assert!((outcome[(0, 0)]).abs() < 1e-12);
    }
}
