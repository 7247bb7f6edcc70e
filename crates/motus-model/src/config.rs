//! Configuration builder for random-forest training.

use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier, RandomForestClassifierParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use tracing::{info, instrument};

use crate::error::ModelError;
use crate::forest::Forest;

/// Configuration for random-forest training.
///
/// Construct via [`ForestConfig::new`], then chain `with_*` methods. The
/// training algorithm itself is delegated to smartcore's
/// `RandomForestClassifier`; this type owns input validation and the
/// parameter mapping.
///
/// # Defaults
///
/// | Parameter           | Default |
/// |---------------------|---------|
/// | `max_depth`         | `None`  |
/// | `min_samples_split` | 2       |
/// | `min_samples_leaf`  | 1       |
/// | `seed`              | 42      |
#[derive(Debug, Clone)]
pub struct ForestConfig {
    n_trees: u16,
    max_depth: Option<u16>,
    min_samples_split: usize,
    min_samples_leaf: usize,
    seed: u64,
}

impl ForestConfig {
    /// Create a new config with the given number of trees.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidTreeCount`] if `n_trees` is zero.
    pub fn new(n_trees: u16) -> Result<Self, ModelError> {
        if n_trees == 0 {
            return Err(ModelError::InvalidTreeCount { n_trees: 0 });
        }
        Ok(Self {
            n_trees,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            seed: 42,
        })
    }

    /// Set the maximum tree depth. `None` means unlimited.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<u16>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the minimum number of samples required to attempt a split.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Set the minimum number of samples required in each leaf.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the number of trees.
    #[must_use]
    pub fn n_trees(&self) -> u16 {
        self.n_trees
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Train a random forest on the provided data.
    ///
    /// `features[sample][feature]` — row-major layout. `labels[sample]` —
    /// encoded class indices (see [`crate::LabelEncoder`]).
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ModelError::EmptyDataset`] | `features` is empty |
    /// | [`ModelError::ZeroFeatures`] | rows have zero feature columns |
    /// | [`ModelError::LabelCountMismatch`] | label and row counts differ |
    /// | [`ModelError::FeatureCountMismatch`] | rows have inconsistent lengths |
    /// | [`ModelError::NonFiniteValue`] | any value is NaN or infinite |
    /// | [`ModelError::Training`] | the underlying library rejected the call |
    #[instrument(skip_all, fields(n_samples = features.len(), n_trees = self.n_trees))]
    pub fn fit(&self, features: &[Vec<f64>], labels: &[u32]) -> Result<Forest, ModelError> {
        validate_matrix(features)?;
        if labels.len() != features.len() {
            return Err(ModelError::LabelCountMismatch {
                n_labels: labels.len(),
                n_samples: features.len(),
            });
        }
        let n_features = features[0].len();

        let mut params = RandomForestClassifierParameters::default()
            .with_n_trees(self.n_trees)
            .with_min_samples_split(self.min_samples_split)
            .with_min_samples_leaf(self.min_samples_leaf)
            .with_seed(self.seed);
        if let Some(depth) = self.max_depth {
            params = params.with_max_depth(depth);
        }

        let x = DenseMatrix::from_2d_vec(&features.to_vec()).map_err(|e| ModelError::Training {
            detail: format!("feature matrix construction failed: {e}"),
        })?;
        let y: Vec<u32> = labels.to_vec();

        let model = RandomForestClassifier::fit(&x, &y, params).map_err(|e| {
            ModelError::Training {
                detail: e.to_string(),
            }
        })?;

        info!(n_features, "random forest trained");
        Ok(Forest::new(model, n_features))
    }
}

/// Shared shape/finiteness validation for training and prediction inputs.
pub(crate) fn validate_matrix(features: &[Vec<f64>]) -> Result<(), ModelError> {
    if features.is_empty() {
        return Err(ModelError::EmptyDataset);
    }
    let expected = features[0].len();
    if expected == 0 {
        return Err(ModelError::ZeroFeatures);
    }
    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != expected {
            return Err(ModelError::FeatureCountMismatch {
                expected,
                got: row.len(),
                sample_index,
            });
        }
        for (feature_index, value) in row.iter().enumerate() {
            if !value.is_finite() {
                return Err(ModelError::NonFiniteValue {
                    sample_index,
                    feature_index,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_trees_rejected() {
        assert!(matches!(
            ForestConfig::new(0).unwrap_err(),
            ModelError::InvalidTreeCount { n_trees: 0 }
        ));
    }

    #[test]
    fn empty_dataset_rejected() {
        let cfg = ForestConfig::new(5).unwrap();
        assert!(matches!(
            cfg.fit(&[], &[]).unwrap_err(),
            ModelError::EmptyDataset
        ));
    }

    #[test]
    fn ragged_rows_rejected() {
        let cfg = ForestConfig::new(5).unwrap();
        let features = vec![vec![1.0, 2.0], vec![3.0]];
        let err = cfg.fit(&features, &[0, 1]).unwrap_err();
        assert!(matches!(
            err,
            ModelError::FeatureCountMismatch { sample_index: 1, expected: 2, got: 1 }
        ));
    }

    #[test]
    fn label_count_mismatch_rejected() {
        let cfg = ForestConfig::new(5).unwrap();
        let features = vec![vec![1.0], vec![2.0]];
        let err = cfg.fit(&features, &[0]).unwrap_err();
        assert!(matches!(err, ModelError::LabelCountMismatch { .. }));
    }

    #[test]
    fn non_finite_value_rejected() {
        let cfg = ForestConfig::new(5).unwrap();
        let features = vec![vec![1.0], vec![f64::NAN]];
        let err = cfg.fit(&features, &[0, 1]).unwrap_err();
        assert!(matches!(
            err,
            ModelError::NonFiniteValue { sample_index: 1, feature_index: 0 }
        ));
    }
}
