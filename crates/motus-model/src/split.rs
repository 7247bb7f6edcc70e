//! Seeded stratified train/test partitioning.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, instrument};

use crate::error::ModelError;
use crate::labels::LabelEncoder;

/// Stratified two-way split: each class contributes the same proportion of
/// its rows to the training side, so label frequencies are preserved on
/// both sides.
///
/// Construct via [`StratifiedSplit::new`], then chain `with_seed`.
#[derive(Debug, Clone)]
pub struct StratifiedSplit {
    train_ratio: f64,
    seed: u64,
}

impl StratifiedSplit {
    /// Create a split with the given training-side ratio.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidSplitRatio`] unless `0 < ratio < 1`.
    pub fn new(train_ratio: f64) -> Result<Self, ModelError> {
        if !(train_ratio > 0.0 && train_ratio < 1.0) {
            return Err(ModelError::InvalidSplitRatio { ratio: train_ratio });
        }
        Ok(Self {
            train_ratio,
            seed: 42,
        })
    }

    /// Set the random seed for the per-class shuffle.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Partition row indices into disjoint (train, test) sets.
    ///
    /// Rows are grouped by class, shuffled within each class, and the first
    /// `round(ratio * n)` of each class (clamped so both sides stay
    /// non-empty) go to the training side. Output indices are sorted, so
    /// relative row order survives the split.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ModelError::EmptyDataset`] | Zero labels |
    /// | [`ModelError::TooFewSamplesForSplit`] | A class has fewer than 2 samples |
    #[instrument(skip_all, fields(n_samples = labels.len(), ratio = self.train_ratio))]
    pub fn split(
        &self,
        labels: &[u32],
        encoder: &LabelEncoder,
    ) -> Result<(Vec<usize>, Vec<usize>), ModelError> {
        if labels.is_empty() {
            return Err(ModelError::EmptyDataset);
        }
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let n_classes = encoder.n_classes();
        let mut class_indices: Vec<Vec<usize>> = vec![vec![]; n_classes];
        for (i, &label) in labels.iter().enumerate() {
            class_indices[label as usize].push(i);
        }

        let mut train = Vec::new();
        let mut test = Vec::new();
        for (class, indices) in class_indices.iter_mut().enumerate() {
            if indices.is_empty() {
                continue;
            }
            if indices.len() < 2 {
                return Err(ModelError::TooFewSamplesForSplit {
                    class: encoder.decode(class as u32).unwrap_or("?").to_string(),
                    count: indices.len(),
                });
            }
            indices.shuffle(&mut rng);
            // Both sides keep at least one row of every class.
            let n_train = ((indices.len() as f64 * self.train_ratio).round() as usize)
                .clamp(1, indices.len() - 1);
            train.extend_from_slice(&indices[..n_train]);
            test.extend_from_slice(&indices[n_train..]);
        }

        train.sort_unstable();
        test.sort_unstable();

        info!(
            n_train = train.len(),
            n_test = test.len(),
            "stratified split complete"
        );
        Ok((train, test))
    }
}

/// Gather the rows of `features` selected by `indices`.
#[must_use]
pub fn take_rows(features: &[Vec<f64>], indices: &[usize]) -> Vec<Vec<f64>> {
    indices.iter().map(|&i| features[i].clone()).collect()
}

/// Gather the labels selected by `indices`.
#[must_use]
pub fn take_labels(labels: &[u32], indices: &[usize]) -> Vec<u32> {
    indices.iter().map(|&i| labels[i]).collect()
}
