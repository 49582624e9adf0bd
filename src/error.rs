//! Error taxonomy for the metrics engine
//!
//! Configuration problems (missing columns, empty QI sets) and invalid
//! arguments (unrecognized method names) are fatal and surfaced before any
//! computation. Per-metric computation failures are *not* represented here:
//! the report assembler captures them as error placeholders inside the
//! report instead (see `models::MetricOutcome`).

use thiserror::Error;

/// Fatal errors raised before or during report assembly.
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// A requested QI or sensitive column does not exist in the dataset.
    #[error("column '{0}' not found in dataset")]
    MissingColumn(String),

    /// The auxiliary (attacker) dataset lacks a required QI column.
    #[error("auxiliary dataset is missing quasi-identifier column '{0}'")]
    MissingAuxColumn(String),

    /// The QI set must contain at least one column.
    #[error("at least one quasi-identifier column is required")]
    NoQuasiIdentifiers,

    /// Unrecognized l-diversity method name.
    #[error("unknown l-diversity method '{0}' (expected 'distinct' or 'entropy')")]
    UnknownLDiversityMethod(String),

    /// Unrecognized t-closeness distance method name.
    #[error("unknown t-closeness method '{0}' (expected 'tvd' or 'emd')")]
    UnknownTMethod(String),

    /// Unrecognized numeric binning method name.
    #[error("unknown binning method '{0}' (expected 'fd' or 'quantile')")]
    UnknownBinningMethod(String),

    /// Columns passed to the dataset builder have unequal lengths.
    #[error("column '{column}' has {len} values, expected {expected}")]
    RaggedColumn {
        column: String,
        len: usize,
        expected: usize,
    },

    /// A row passed to the dataset builder has the wrong arity.
    #[error("row {row} has {len} values, expected {expected}")]
    RaggedRow {
        row: usize,
        len: usize,
        expected: usize,
    },

    /// Two columns share the same name.
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),
}
