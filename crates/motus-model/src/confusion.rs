//! Confusion matrix, accuracy, Cohen's kappa, and per-class statistics.

use std::fmt;

use crate::error::ModelError;

/// A multi-class confusion matrix.
///
/// Counts are stored row-major in a flat buffer; the entry for
/// `(true_class t, predicted_class p)` is `counts[t * n_classes + p]`.
#[derive(Debug, Clone)]
pub struct ConfusionMatrix {
    counts: Vec<usize>,
    n_classes: usize,
    class_names: Vec<String>,
}

/// Per-class statistics in the reporting style of the statistical toolkit
/// the analysis mirrors: sensitivity/specificity rather than
/// precision/recall.
#[derive(Debug, Clone)]
pub struct ClassStats {
    /// Class name.
    pub class: String,
    /// Sensitivity (true-positive rate): TP / (TP + FN). 0.0 without true samples.
    pub sensitivity: f64,
    /// Specificity (true-negative rate): TN / (TN + FP). 0.0 without negatives.
    pub specificity: f64,
    /// Mean of sensitivity and specificity.
    pub balanced_accuracy: f64,
    /// Number of true samples of this class.
    pub support: usize,
}

impl ConfusionMatrix {
    /// Build a confusion matrix from encoded true and predicted labels.
    ///
    /// `class_names[i]` names class index `i` and fixes `n_classes`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ModelError::EmptyDataset`] | Zero labels provided |
    /// | [`ModelError::LabelCountMismatch`] | True/predicted lengths differ |
    pub fn from_labels(
        true_labels: &[u32],
        predicted: &[u32],
        class_names: &[String],
    ) -> Result<Self, ModelError> {
        if true_labels.is_empty() {
            return Err(ModelError::EmptyDataset);
        }
        if true_labels.len() != predicted.len() {
            return Err(ModelError::LabelCountMismatch {
                n_labels: predicted.len(),
                n_samples: true_labels.len(),
            });
        }
        let n_classes = class_names.len();
        let mut counts = vec![0usize; n_classes * n_classes];
        for (&t, &p) in true_labels.iter().zip(predicted.iter()) {
            counts[t as usize * n_classes + p as usize] += 1;
        }
        Ok(Self {
            counts,
            n_classes,
            class_names: class_names.to_vec(),
        })
    }

    /// Add another matrix's counts into this one (fold aggregation).
    ///
    /// Both matrices must come from the same class set; this is an internal
    /// invariant of cross-validation.
    pub(crate) fn absorb(&mut self, other: &ConfusionMatrix) {
        debug_assert_eq!(self.n_classes, other.n_classes);
        for (a, b) in self.counts.iter_mut().zip(&other.counts) {
            *a += b;
        }
    }

    fn at(&self, true_class: usize, predicted_class: usize) -> usize {
        self.counts[true_class * self.n_classes + predicted_class]
    }

    /// Total number of counted samples.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Overall accuracy: proportion of on-diagonal counts.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct: usize = (0..self.n_classes).map(|i| self.at(i, i)).sum();
        correct as f64 / total as f64
    }

    /// Cohen's kappa: agreement beyond chance, from the marginal
    /// distributions of true and predicted labels.
    #[must_use]
    pub fn kappa(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let observed = self.accuracy();
        let expected: f64 = (0..self.n_classes)
            .map(|c| {
                let row: usize = (0..self.n_classes).map(|p| self.at(c, p)).sum();
                let col: usize = (0..self.n_classes).map(|t| self.at(t, c)).sum();
                (row as f64 / total as f64) * (col as f64 / total as f64)
            })
            .sum();
        if (1.0 - expected).abs() < f64::EPSILON {
            // Degenerate marginals (single class): fall back to raw agreement.
            return observed;
        }
        (observed - expected) / (1.0 - expected)
    }

    /// Per-class sensitivity, specificity, and balanced accuracy.
    #[must_use]
    pub fn class_stats(&self) -> Vec<ClassStats> {
        let total = self.total();
        (0..self.n_classes)
            .map(|c| {
                let tp = self.at(c, c);
                let fn_: usize = (0..self.n_classes)
                    .filter(|&p| p != c)
                    .map(|p| self.at(c, p))
                    .sum();
                let fp: usize = (0..self.n_classes)
                    .filter(|&t| t != c)
                    .map(|t| self.at(t, c))
                    .sum();
                let support = tp + fn_;
                let tn = total - tp - fn_ - fp;

                let sensitivity = if support == 0 {
                    0.0
                } else {
                    tp as f64 / support as f64
                };
                let specificity = if tn + fp == 0 {
                    0.0
                } else {
                    tn as f64 / (tn + fp) as f64
                };
                ClassStats {
                    class: self.class_names[c].clone(),
                    sensitivity,
                    specificity,
                    balanced_accuracy: (sensitivity + specificity) / 2.0,
                    support,
                }
            })
            .collect()
    }

    /// Return the counts as nested rows, `rows[true][predicted]`.
    #[must_use]
    pub fn as_rows(&self) -> Vec<Vec<usize>> {
        self.counts
            .chunks(self.n_classes)
            .map(<[usize]>::to_vec)
            .collect()
    }

    /// Return the class names in index order.
    #[must_use]
    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    /// Return the number of classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>10}", "")?;
        for name in &self.class_names {
            write!(f, " {name:>8}")?;
        }
        writeln!(f)?;
        for (t, name) in self.class_names.iter().enumerate() {
            write!(f, "{name:>10}")?;
            for p in 0..self.n_classes {
                write!(f, " {:>8}", self.at(t, p))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn perfect_predictions() {
        let truth = vec![0, 0, 1, 1, 2, 2];
        let cm = ConfusionMatrix::from_labels(&truth, &truth, &names(&["A", "B", "C"])).unwrap();
        assert!((cm.accuracy() - 1.0).abs() < f64::EPSILON);
        assert!((cm.kappa() - 1.0).abs() < 1e-10);
        for s in cm.class_stats() {
            assert!((s.sensitivity - 1.0).abs() < f64::EPSILON);
            assert!((s.specificity - 1.0).abs() < f64::EPSILON);
            assert!((s.balanced_accuracy - 1.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn known_counts_and_stats() {
        // True: [A,A,A, B,B,B], Pred: [A,A,B, B,B,A]
        let truth = vec![0, 0, 0, 1, 1, 1];
        let pred = vec![0, 0, 1, 1, 1, 0];
        let cm = ConfusionMatrix::from_labels(&truth, &pred, &names(&["A", "B"])).unwrap();

        assert_eq!(cm.as_rows(), vec![vec![2, 1], vec![1, 2]]);
        assert!((cm.accuracy() - 4.0 / 6.0).abs() < 1e-10);

        let stats = cm.class_stats();
        // A: TP=2, FN=1, FP=1, TN=2.
        assert!((stats[0].sensitivity - 2.0 / 3.0).abs() < 1e-10);
        assert!((stats[0].specificity - 2.0 / 3.0).abs() < 1e-10);
        assert_eq!(stats[0].support, 3);

        // Balanced marginals: kappa = (2/3 - 1/2) / (1 - 1/2) = 1/3.
        assert!((cm.kappa() - 1.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn kappa_zero_for_chance_agreement() {
        // Predictions independent of truth, uniform marginals.
        let truth = vec![0, 0, 1, 1];
        let pred = vec![0, 1, 0, 1];
        let cm = ConfusionMatrix::from_labels(&truth, &pred, &names(&["A", "B"])).unwrap();
        assert!(cm.kappa().abs() < 1e-10);
    }

    #[test]
    fn absent_class_has_zero_support() {
        let truth = vec![0, 0, 1, 1];
        let pred = vec![0, 0, 1, 1];
        let cm = ConfusionMatrix::from_labels(&truth, &pred, &names(&["A", "B", "C"])).unwrap();
        let stats = cm.class_stats();
        assert_eq!(stats[2].support, 0);
        assert!((stats[2].sensitivity - 0.0).abs() < f64::EPSILON);
        // All 4 samples are true negatives for the absent class.
        assert!((stats[2].specificity - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_labels_rejected() {
        let err = ConfusionMatrix::from_labels(&[], &[], &names(&["A"])).unwrap_err();
        assert!(matches!(err, ModelError::EmptyDataset));
    }

    #[test]
    fn length_mismatch_rejected() {
        let err = ConfusionMatrix::from_labels(&[0, 1], &[0], &names(&["A", "B"])).unwrap_err();
        assert!(matches!(err, ModelError::LabelCountMismatch { .. }));
    }

    #[test]
    fn display_includes_class_names() {
        let cm =
            ConfusionMatrix::from_labels(&[0, 1], &[0, 1], &names(&["A", "B"])).unwrap();
        let rendered = format!("{cm}");
        assert!(rendered.contains('A'));
        assert!(rendered.contains('B'));
    }

    #[test]
    fn absorb_sums_counts() {
        let a = ConfusionMatrix::from_labels(&[0, 1], &[0, 1], &names(&["A", "B"])).unwrap();
        let mut b = ConfusionMatrix::from_labels(&[0, 1], &[1, 1], &names(&["A", "B"])).unwrap();
        b.absorb(&a);
        assert_eq!(b.total(), 4);
        assert_eq!(b.as_rows()[0], vec![1, 1]);
    }
}
