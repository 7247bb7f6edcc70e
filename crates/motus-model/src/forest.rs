//! Trained-model handle and batch prediction.

use smartcore::ensemble::random_forest_classifier::RandomForestClassifier;
use smartcore::linalg::basic::matrix::DenseMatrix;
use tracing::{info, instrument};

use crate::config::validate_matrix;
use crate::error::ModelError;

/// An opaque trained random-forest handle.
///
/// Produced by [`crate::ForestConfig::fit`]; callers treat training and
/// prediction as blocking calls and never see the underlying trees.
pub struct Forest {
    model: RandomForestClassifier<f64, u32, DenseMatrix<f64>, Vec<u32>>,
    n_features: usize,
}

impl Forest {
    pub(crate) fn new(
        model: RandomForestClassifier<f64, u32, DenseMatrix<f64>, Vec<u32>>,
        n_features: usize,
    ) -> Self {
        Self { model, n_features }
    }

    /// Return the feature arity the model was trained with.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Predict class indices for a batch of samples.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ModelError::EmptyDataset`] | Zero rows |
    /// | [`ModelError::FeatureCountMismatch`] | Rows have inconsistent lengths |
    /// | [`ModelError::NonFiniteValue`] | Any value is NaN or infinite |
    /// | [`ModelError::PredictionFeatureMismatch`] | Arity differs from training |
    /// | [`ModelError::Prediction`] | The underlying library rejected the call |
    #[instrument(skip_all, fields(n_samples = features.len()))]
    pub fn predict_batch(&self, features: &[Vec<f64>]) -> Result<Vec<u32>, ModelError> {
        validate_matrix(features)?;
        if features[0].len() != self.n_features {
            return Err(ModelError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: features[0].len(),
            });
        }

        let x = DenseMatrix::from_2d_vec(&features.to_vec()).map_err(|e| {
            ModelError::Prediction {
                detail: format!("feature matrix construction failed: {e}"),
            }
        })?;
        let predicted = self.model.predict(&x).map_err(|e| ModelError::Prediction {
            detail: e.to_string(),
        })?;

        info!(n_predictions = predicted.len(), "batch prediction complete");
        Ok(predicted)
    }
}

impl std::fmt::Debug for Forest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forest")
            .field("n_features", &self.n_features)
            .finish_non_exhaustive()
    }
}
