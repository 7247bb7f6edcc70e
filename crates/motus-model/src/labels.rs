//! String class labels <-> dense integer indices.

use crate::ModelError;

/// Maps string class labels to dense `u32` indices and back.
///
/// Classes are indexed in sorted order, so the mapping is deterministic for
/// a given label set regardless of row order.
#[derive(Debug, Clone)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Build an encoder over the distinct labels in `labels`.
    #[must_use]
    pub fn fit(labels: &[String]) -> Self {
        let mut classes: Vec<String> = labels.to_vec();
        classes.sort_unstable();
        classes.dedup();
        Self { classes }
    }

    /// Encode labels to class indices.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownLabel`] for a label absent at fit time.
    pub fn encode(&self, labels: &[String]) -> Result<Vec<u32>, ModelError> {
        labels
            .iter()
            .map(|label| {
                self.classes
                    .binary_search(label)
                    .map(|i| i as u32)
                    .map_err(|_| ModelError::UnknownLabel {
                        label: label.clone(),
                    })
            })
            .collect()
    }

    /// Decode one class index back to its label.
    ///
    /// Indices outside the class range decode to `None`.
    #[must_use]
    pub fn decode(&self, index: u32) -> Option<&str> {
        self.classes.get(index as usize).map(String::as_str)
    }

    /// Decode a batch of indices, substituting `"?"` for out-of-range ones.
    #[must_use]
    pub fn decode_batch(&self, indices: &[u32]) -> Vec<String> {
        indices
            .iter()
            .map(|&i| self.decode(i).unwrap_or("?").to_string())
            .collect()
    }

    /// Return the class labels in index order.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Return the number of distinct classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }
}
