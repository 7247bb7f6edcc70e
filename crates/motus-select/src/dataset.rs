//! Dataset domain types.

use crate::SelectError;

/// A single cell of a tabular dataset.
///
/// Missing-token normalization happens at read time — by the time a
/// [`Dataset`] exists, every "not available" / "division by zero" / empty
/// spelling has already collapsed into [`Cell::Missing`].
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// No value recorded for this row/column.
    Missing,
    /// A finite numeric value.
    Number(f64),
    /// A non-numeric token (labels, identifiers, flags).
    Text(String),
}

impl Cell {
    /// Return `true` if this cell is the missing sentinel.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Return the numeric value, if this cell holds one.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }
}

/// An ordered tabular dataset: named columns over row-major cells.
///
/// Column names and rows are kept in parallel — `rows[r][c]` is the value
/// of column `columns[c]` at row `r`. Mutation is limited to column removal
/// (via the selection functions, which return new datasets); rows are never
/// edited in place.
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Dataset {
    /// Create a dataset, validating that every row matches the column count.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::RowWidthMismatch`] for the first row whose
    /// cell count differs from `columns.len()`.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, SelectError> {
        let expected = columns.len();
        for (row_index, row) in rows.iter().enumerate() {
            if row.len() != expected {
                return Err(SelectError::RowWidthMismatch {
                    row_index,
                    expected,
                    got: row.len(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    /// Return the column names in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Return the rows (row-major).
    #[must_use]
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Return the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Return the number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Return the index of the named column, if present.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterate the cells of one column, top to bottom.
    pub fn column(&self, index: usize) -> impl Iterator<Item = &Cell> {
        self.rows.iter().map(move |row| &row[index])
    }

    /// Build a new dataset keeping only the columns where `keep[c]` is true.
    ///
    /// Relative column order is preserved. `keep.len()` must equal the
    /// column count; this is an internal invariant of the selection stages.
    pub(crate) fn retain_columns(&self, keep: &[bool]) -> Self {
        debug_assert_eq!(keep.len(), self.columns.len());
        let columns: Vec<String> = self
            .columns
            .iter()
            .zip(keep)
            .filter(|(_, &k)| k)
            .map(|(c, _)| c.clone())
            .collect();
        let rows: Vec<Vec<Cell>> = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(keep)
                    .filter(|(_, &k)| k)
                    .map(|(cell, _)| cell.clone())
                    .collect()
            })
            .collect();
        Self { columns, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_accepts_consistent_rows() {
        let ds = Dataset::new(
            vec!["a".into(), "b".into()],
            vec![
                vec![Cell::Number(1.0), Cell::Missing],
                vec![Cell::Text("x".into()), Cell::Number(2.0)],
            ],
        )
        .unwrap();
        assert_eq!(ds.n_rows(), 2);
        assert_eq!(ds.n_cols(), 2);
    }

    #[test]
    fn new_rejects_ragged_rows() {
        let err = Dataset::new(
            vec!["a".into(), "b".into()],
            vec![vec![Cell::Number(1.0)]],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SelectError::RowWidthMismatch { row_index: 0, expected: 2, got: 1 }
        ));
    }

    #[test]
    fn column_index_lookup() {
        let ds = Dataset::new(vec!["roll_belt".into(), "classe".into()], vec![]).unwrap();
        assert_eq!(ds.column_index("classe"), Some(1));
        assert_eq!(ds.column_index("pitch_belt"), None);
    }

    #[test]
    fn retain_columns_preserves_order() {
        let ds = Dataset::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![vec![
                Cell::Number(1.0),
                Cell::Number(2.0),
                Cell::Number(3.0),
            ]],
        )
        .unwrap();
        let kept = ds.retain_columns(&[true, false, true]);
        assert_eq!(kept.columns(), &["a".to_string(), "c".to_string()]);
        assert_eq!(kept.rows()[0], vec![Cell::Number(1.0), Cell::Number(3.0)]);
    }

    #[test]
    fn cell_as_number() {
        assert_eq!(Cell::Number(1.5).as_number(), Some(1.5));
        assert_eq!(Cell::Missing.as_number(), None);
        assert!(Cell::Missing.is_missing());
    }
}
