//! Near-zero-variance diagnostic.
//!
//! Flags columns whose non-missing values are almost constant: the
//! frequency ratio of the two most common values exceeds `19.0` (95/5) and
//! the percentage of unique values is below `10.0`. These are the
//! conventional cutoffs of the statistical toolkit the analysis mirrors.

use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::{Cell, Dataset};

/// Frequency-ratio cutoff above which a column is suspect.
const FREQ_RATIO_CUTOFF: f64 = 19.0;
/// Percent-unique cutoff below which a column is suspect.
const PERCENT_UNIQUE_CUTOFF: f64 = 10.0;

/// Diagnostic result for one column.
#[derive(Debug, Clone)]
pub struct NzvReport {
    /// Column name.
    pub column: String,
    /// Ratio of the most common value's count to the second most common's.
    /// `0.0` when the column has no non-missing values; equal counts give `1.0`.
    pub freq_ratio: f64,
    /// Unique non-missing values as a percentage of total rows.
    pub percent_unique: f64,
    /// Whether both cutoffs were tripped.
    pub flagged: bool,
}

/// Canonical key for counting distinct cell values.
fn value_key(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Missing => None,
        Cell::Number(v) => Some(format!("n:{}", v.to_bits())),
        Cell::Text(t) => Some(format!("t:{t}")),
    }
}

/// Compute the near-zero-variance diagnostic for every column.
///
/// Missing cells are excluded from the counts. A column with no rows or no
/// non-missing values reports `freq_ratio = 0.0`, `percent_unique = 0.0`,
/// unflagged — whether such a column survives is the populate check's call,
/// not this diagnostic's.
#[instrument(skip(dataset), fields(n_cols = dataset.n_cols(), n_rows = dataset.n_rows()))]
#[must_use]
pub fn near_zero_variance(dataset: &Dataset) -> Vec<NzvReport> {
    let n_rows = dataset.n_rows();
    let reports: Vec<NzvReport> = dataset
        .columns()
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let mut counts: HashMap<String, usize> = HashMap::new();
            for cell in dataset.column(index) {
                if let Some(key) = value_key(cell) {
                    *counts.entry(key).or_insert(0) += 1;
                }
            }

            let mut sorted: Vec<usize> = counts.values().copied().collect();
            sorted.sort_unstable_by(|a, b| b.cmp(a));

            let freq_ratio = match (sorted.first(), sorted.get(1)) {
                (Some(&first), Some(&second)) => first as f64 / second as f64,
                // A single distinct value is the degenerate constant column.
                (Some(_), None) => f64::INFINITY,
                (None, _) => 0.0,
            };
            let percent_unique = if n_rows == 0 {
                0.0
            } else {
                counts.len() as f64 / n_rows as f64 * 100.0
            };
            let flagged = freq_ratio > FREQ_RATIO_CUTOFF && percent_unique < PERCENT_UNIQUE_CUTOFF;

            NzvReport {
                column: name.clone(),
                freq_ratio,
                percent_unique,
                flagged,
            }
        })
        .collect();

    let n_flagged = reports.iter().filter(|r| r.flagged).count();
    debug!(n_flagged, "near-zero-variance diagnostic computed");
    reports
}

/// Remove every column the diagnostic flagged.
///
/// Returns the input unchanged (cloned) when nothing is flagged — the
/// common case for the reference data, where every column passes.
#[must_use]
pub fn drop_flagged(dataset: &Dataset, reports: &[NzvReport]) -> Dataset {
    let keep: Vec<bool> = dataset
        .columns()
        .iter()
        .map(|name| {
            !reports
                .iter()
                .any(|r| r.flagged && r.column == *name)
        })
        .collect();
    dataset.retain_columns(&keep)
}
