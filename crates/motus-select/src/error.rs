//! Error types for selection, checking, and shaping.

/// Errors from column filtering, dataset checks, and matrix shaping.
#[derive(Debug, thiserror::Error)]
pub enum SelectError {
    /// Returned when a row has a different number of cells than there are columns.
    #[error("row {row_index} has {got} cells, expected {expected}")]
    RowWidthMismatch {
        /// Zero-based row index.
        row_index: usize,
        /// Expected cell count (number of columns).
        expected: usize,
        /// Actual cell count in this row.
        got: usize,
    },

    /// Returned when a prefix rule set matches zero columns.
    ///
    /// A filter that removes nothing means the dataset does not follow the
    /// naming convention the rules were written for; passing it through
    /// unchanged would silently defeat the filter.
    #[error("no column matched any of the prefixes {prefixes:?}; dataset does not follow the naming convention")]
    ConventionMismatch {
        /// The prefixes that found no match.
        prefixes: Vec<&'static str>,
    },

    /// Returned when fewer columns remain than the filter needs to drop.
    #[error("only {remaining} columns remain, cannot drop the {required} leading metadata columns")]
    TooFewColumns {
        /// Columns remaining at this stage.
        remaining: usize,
        /// Columns the stage must drop.
        required: usize,
    },

    /// Returned when a retained column still holds a missing value.
    ///
    /// The selector's whole purpose is to leave only fully populated
    /// columns; a missing cell past this point would reach the classifier.
    #[error("column \"{column}\" is missing a value at row {row_index} after filtering")]
    MissingValueLeakage {
        /// Name of the offending column.
        column: String,
        /// Zero-based row index of the missing cell.
        row_index: usize,
    },

    /// Returned when the labeled and unlabeled datasets disagree on the
    /// filtered column set.
    #[error("schema drift at column position {position}: labeled has \"{labeled}\", unlabeled has \"{unlabeled}\"")]
    SchemaDrift {
        /// Zero-based position of the first disagreement.
        position: usize,
        /// Column name on the labeled side ("<absent>" if exhausted).
        labeled: String,
        /// Column name on the unlabeled side ("<absent>" if exhausted).
        unlabeled: String,
    },

    /// Returned when a feature cell holds text where a number is required.
    #[error("column \"{column}\" holds non-numeric value \"{value}\" at row {row_index}")]
    NonNumericCell {
        /// Name of the offending column.
        column: String,
        /// Zero-based row index.
        row_index: usize,
        /// The textual cell content.
        value: String,
    },

    /// Returned when an operation needs a label column but the dataset has
    /// no columns at all.
    #[error("dataset has no columns")]
    EmptyDataset,
}
