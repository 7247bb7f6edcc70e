//! Dense-matrix shaping for the model layer.
//!
//! The model layer works on row-major `f64` matrices with string labels
//! held separately; these conversions are the last step before training
//! and prediction, and the point where any remaining missing or textual
//! feature cell becomes a hard error.

use tracing::{info, instrument};

use crate::{Cell, Dataset, SelectError};

/// A labeled dataset shaped for training: features, labels, and names
/// in parallel — `features[i]` carries the row labeled `labels[i]`.
#[derive(Debug)]
pub struct TrainingMatrix {
    features: Vec<Vec<f64>>,
    labels: Vec<String>,
    feature_names: Vec<String>,
}

impl TrainingMatrix {
    /// Return the feature matrix (row-major).
    #[must_use]
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// Return the string class label of each row.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Return the feature column names.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Return the number of rows.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.features.len()
    }

    /// Return the number of feature columns.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }
}

/// An unlabeled dataset shaped for prediction.
#[derive(Debug)]
pub struct FeatureMatrix {
    features: Vec<Vec<f64>>,
    feature_names: Vec<String>,
}

impl FeatureMatrix {
    /// Return the feature matrix (row-major).
    #[must_use]
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// Return the feature column names.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Return the number of rows.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.features.len()
    }
}

fn numeric_cell(
    cell: &Cell,
    column: &str,
    row_index: usize,
) -> Result<f64, SelectError> {
    match cell {
        Cell::Number(v) => Ok(*v),
        Cell::Missing => Err(SelectError::MissingValueLeakage {
            column: column.to_string(),
            row_index,
        }),
        Cell::Text(t) => Err(SelectError::NonNumericCell {
            column: column.to_string(),
            row_index,
            value: t.clone(),
        }),
    }
}

/// Shape a labeled dataset: the trailing column is the class label, every
/// other cell must be numeric.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`SelectError::EmptyDataset`] | Zero columns |
/// | [`SelectError::MissingValueLeakage`] | A feature or label cell is missing |
/// | [`SelectError::NonNumericCell`] | A feature cell holds text |
#[instrument(skip(dataset), fields(n_rows = dataset.n_rows(), n_cols = dataset.n_cols()))]
pub fn to_training_matrix(dataset: &Dataset) -> Result<TrainingMatrix, SelectError> {
    if dataset.n_cols() == 0 {
        return Err(SelectError::EmptyDataset);
    }
    let label_index = dataset.n_cols() - 1;
    let label_name = &dataset.columns()[label_index];
    let feature_names: Vec<String> = dataset.columns()[..label_index].to_vec();

    let mut features = Vec::with_capacity(dataset.n_rows());
    let mut labels = Vec::with_capacity(dataset.n_rows());

    for (row_index, row) in dataset.rows().iter().enumerate() {
        let mut values = Vec::with_capacity(label_index);
        for (col_index, cell) in row[..label_index].iter().enumerate() {
            values.push(numeric_cell(cell, &feature_names[col_index], row_index)?);
        }
        let label = match &row[label_index] {
            Cell::Text(t) => t.clone(),
            // A numeric class label is legal, if unusual.
            Cell::Number(v) => v.to_string(),
            Cell::Missing => {
                return Err(SelectError::MissingValueLeakage {
                    column: label_name.clone(),
                    row_index,
                })
            }
        };
        features.push(values);
        labels.push(label);
    }

    info!(
        n_samples = features.len(),
        n_features = feature_names.len(),
        "training matrix shaped"
    );
    Ok(TrainingMatrix {
        features,
        labels,
        feature_names,
    })
}

/// Shape an unlabeled dataset: every cell must be numeric.
///
/// # Errors
///
/// Same contract as [`to_training_matrix`], without the label handling.
#[instrument(skip(dataset), fields(n_rows = dataset.n_rows(), n_cols = dataset.n_cols()))]
pub fn to_feature_matrix(dataset: &Dataset) -> Result<FeatureMatrix, SelectError> {
    let feature_names = dataset.columns().to_vec();
    let mut features = Vec::with_capacity(dataset.n_rows());

    for (row_index, row) in dataset.rows().iter().enumerate() {
        let mut values = Vec::with_capacity(feature_names.len());
        for (col_index, cell) in row.iter().enumerate() {
            values.push(numeric_cell(cell, &feature_names[col_index], row_index)?);
        }
        features.push(values);
    }

    info!(
        n_samples = features.len(),
        n_features = feature_names.len(),
        "feature matrix shaped"
    );
    Ok(FeatureMatrix {
        features,
        feature_names,
    })
}
