//! Stratified k-fold cross-validation.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, instrument};

use crate::config::ForestConfig;
use crate::confusion::ConfusionMatrix;
use crate::error::ModelError;
use crate::labels::LabelEncoder;
use crate::split::{take_labels, take_rows};

/// Cross-validation configuration.
///
/// Construct via [`CrossValidation::new`], then chain `with_seed`.
#[derive(Debug, Clone)]
pub struct CrossValidation {
    n_folds: usize,
    seed: u64,
}

/// Results of stratified k-fold cross-validation.
#[derive(Debug)]
pub struct CrossValidationResult {
    /// Accuracy for each fold.
    pub fold_accuracies: Vec<f64>,
    /// Confusion matrix aggregated across all held-out folds.
    pub confusion_matrix: ConfusionMatrix,
    /// Mean accuracy across folds.
    pub mean_accuracy: f64,
    /// Standard deviation of fold accuracies.
    pub std_accuracy: f64,
    /// Number of folds.
    pub n_folds: usize,
    /// Total number of samples.
    pub n_samples: usize,
}

impl CrossValidation {
    /// Create a cross-validation config with the given fold count.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidFoldCount`] if `n_folds` < 2.
    pub fn new(n_folds: usize) -> Result<Self, ModelError> {
        if n_folds < 2 {
            return Err(ModelError::InvalidFoldCount { n_folds });
        }
        Ok(Self { n_folds, seed: 42 })
    }

    /// Set the random seed for fold shuffling.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Run stratified k-fold cross-validation.
    ///
    /// Each fold trains a forest (with a fold-derived seed) on the other
    /// folds and scores the held-out fold; fold composition preserves class
    /// proportions.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ModelError::EmptyDataset`] | Zero samples |
    /// | [`ModelError::TooFewSamplesForFolds`] | A class has fewer samples than folds |
    /// | Other model errors | From underlying training/prediction |
    #[instrument(skip_all, fields(n_folds = self.n_folds, n_samples = features.len()))]
    pub fn evaluate(
        &self,
        config: &ForestConfig,
        features: &[Vec<f64>],
        labels: &[u32],
        encoder: &LabelEncoder,
    ) -> Result<CrossValidationResult, ModelError> {
        if features.is_empty() {
            return Err(ModelError::EmptyDataset);
        }
        let n_samples = features.len();
        let fold_of = self.assign_folds(labels, encoder)?;

        let mut fold_accuracies = Vec::with_capacity(self.n_folds);
        let mut aggregate: Option<ConfusionMatrix> = None;

        for fold in 0..self.n_folds {
            let train_idx: Vec<usize> = (0..n_samples).filter(|&i| fold_of[i] != fold).collect();
            let test_idx: Vec<usize> = (0..n_samples).filter(|&i| fold_of[i] == fold).collect();

            let fold_config = config
                .clone()
                .with_seed(config.seed().wrapping_add(fold as u64));
            let forest = fold_config.fit(
                &take_rows(features, &train_idx),
                &take_labels(labels, &train_idx),
            )?;

            let test_labels = take_labels(labels, &test_idx);
            let predicted = forest.predict_batch(&take_rows(features, &test_idx))?;

            let fold_cm =
                ConfusionMatrix::from_labels(&test_labels, &predicted, encoder.classes())?;
            let fold_accuracy = fold_cm.accuracy();
            fold_accuracies.push(fold_accuracy);
            info!(fold, accuracy = fold_accuracy, "fold completed");

            match aggregate.as_mut() {
                Some(cm) => cm.absorb(&fold_cm),
                None => aggregate = Some(fold_cm),
            }
        }

        let mean_accuracy = fold_accuracies.iter().sum::<f64>() / self.n_folds as f64;
        let variance = fold_accuracies
            .iter()
            .map(|&a| (a - mean_accuracy).powi(2))
            .sum::<f64>()
            / self.n_folds as f64;

        // aggregate is Some: n_folds >= 2 and every fold held out rows.
        let confusion_matrix = aggregate.ok_or(ModelError::EmptyDataset)?;

        info!(mean_accuracy, "cross-validation complete");
        Ok(CrossValidationResult {
            fold_accuracies,
            confusion_matrix,
            mean_accuracy,
            std_accuracy: variance.sqrt(),
            n_folds: self.n_folds,
            n_samples,
        })
    }

    /// Assign each row to a fold: group by class, shuffle within each
    /// class, round-robin across folds.
    fn assign_folds(
        &self,
        labels: &[u32],
        encoder: &LabelEncoder,
    ) -> Result<Vec<usize>, ModelError> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let mut class_indices: Vec<Vec<usize>> = vec![vec![]; encoder.n_classes()];
        for (i, &label) in labels.iter().enumerate() {
            class_indices[label as usize].push(i);
        }

        for (class, indices) in class_indices.iter().enumerate() {
            if !indices.is_empty() && indices.len() < self.n_folds {
                return Err(ModelError::TooFewSamplesForFolds {
                    class: encoder.decode(class as u32).unwrap_or("?").to_string(),
                    count: indices.len(),
                    n_folds: self.n_folds,
                });
            }
        }

        let mut fold_of = vec![0usize; labels.len()];
        for indices in &mut class_indices {
            indices.shuffle(&mut rng);
            for (j, &idx) in indices.iter().enumerate() {
                fold_of[idx] = j % self.n_folds;
            }
        }
        Ok(fold_of)
    }
}
