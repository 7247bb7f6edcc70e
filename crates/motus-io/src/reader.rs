//! CSV table reader with missing-token normalization and input validation.

use std::path::{Path, PathBuf};

use motus_select::{Cell, Dataset};
use tracing::{debug, info, instrument};

use crate::IoError;

/// Tokens normalized to the missing sentinel on read.
///
/// The raw exports spell "not available" as `NA`, spreadsheet division
/// errors as `#DIV/0!`, and leave some cells empty; all three collapse to
/// [`Cell::Missing`] before any filtering logic sees the data.
const MISSING_TOKENS: [&str; 3] = ["NA", "#DIV/0!", ""];

/// Reads a delimited-text table into a [`Dataset`].
///
/// Expected format:
/// - Header row required; every column name is kept as-is.
/// - All rows must have the same number of columns as the header.
/// - Cells parse in order: missing token -> [`Cell::Missing`], finite
///   float -> [`Cell::Number`], anything else -> [`Cell::Text`].
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::NoColumns`] | Header has zero columns |
/// | [`IoError::EmptyTable`] | Zero data rows after header |
/// | [`IoError::InconsistentRowLength`] | Row column count differs from header |
/// | [`IoError::NonFiniteValue`] | Cell spells NaN or an infinity |
pub struct TableReader {
    path: PathBuf,
}

impl TableReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the CSV file, returning a [`Dataset`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Dataset, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) lets our own row-width check fire instead of a
        // low-level CsvParse error.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        })?;
        let columns: Vec<String> = header.iter().map(String::from).collect();
        let expected_cols = columns.len();
        if expected_cols == 0 {
            return Err(IoError::NoColumns {
                path: self.path.clone(),
            });
        }
        debug!(expected_cols, "read CSV header");

        let mut rows: Vec<Vec<Cell>> = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| IoError::CsvParse {
                path: self.path.clone(),
                offset: e.position().map_or(0, |p| p.byte()),
                source: e,
            })?;

            if record.len() != expected_cols {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: expected_cols,
                    got: record.len(),
                });
            }

            let mut cells = Vec::with_capacity(expected_cols);
            for (col_index, raw) in record.iter().enumerate() {
                cells.push(self.parse_cell(raw, row_index, &columns[col_index])?);
            }
            rows.push(cells);
        }

        if rows.is_empty() {
            return Err(IoError::EmptyTable {
                path: self.path.clone(),
            });
        }

        let dataset = Dataset::new(columns, rows).map_err(|e| IoError::InvalidDataset {
            path: self.path.clone(),
            source: e,
        })?;

        info!(
            n_rows = dataset.n_rows(),
            n_cols = dataset.n_cols(),
            "table loaded"
        );
        Ok(dataset)
    }

    /// Normalize one raw cell.
    fn parse_cell(&self, raw: &str, row_index: usize, column: &str) -> Result<Cell, IoError> {
        let trimmed = raw.trim();
        if MISSING_TOKENS.contains(&trimmed) {
            return Ok(Cell::Missing);
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Cell::Number(value)),
            Ok(_) => Err(IoError::NonFiniteValue {
                path: self.path.clone(),
                row_index,
                column: column.to_string(),
                raw: raw.to_string(),
            }),
            Err(_) => Ok(Cell::Text(trimmed.to_string())),
        }
    }
}
