//! Error types for model configuration, training, and prediction.

/// Errors from the model layer.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Returned when n_trees is zero.
    #[error("n_trees must be at least 1, got {n_trees}")]
    InvalidTreeCount {
        /// The invalid n_trees value provided.
        n_trees: usize,
    },

    /// Returned when the train ratio is outside (0.0, 1.0).
    #[error("train ratio must be in (0.0, 1.0), got {ratio}")]
    InvalidSplitRatio {
        /// The invalid ratio provided.
        ratio: f64,
    },

    /// Returned when n_folds is less than 2.
    #[error("n_folds must be at least 2, got {n_folds}")]
    InvalidFoldCount {
        /// The invalid n_folds value provided.
        n_folds: usize,
    },

    /// Returned when the training dataset has zero samples.
    #[error("training dataset has zero samples")]
    EmptyDataset,

    /// Returned when the training dataset has zero feature columns.
    #[error("training dataset has zero feature columns")]
    ZeroFeatures,

    /// Returned when a sample has a different number of features than expected.
    #[error("sample {sample_index} has {got} features, expected {expected}")]
    FeatureCountMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the sample.
        got: usize,
        /// The zero-based index of the offending sample.
        sample_index: usize,
    },

    /// Returned when the label vector and feature matrix disagree in length.
    #[error("{n_labels} labels for {n_samples} samples")]
    LabelCountMismatch {
        /// Number of labels provided.
        n_labels: usize,
        /// Number of feature rows provided.
        n_samples: usize,
    },

    /// Returned when a training value is NaN or infinite.
    #[error("non-finite value at sample {sample_index}, feature {feature_index}")]
    NonFiniteValue {
        /// The zero-based index of the offending sample.
        sample_index: usize,
        /// The zero-based index of the offending feature column.
        feature_index: usize,
    },

    /// Returned when prediction input arity differs from the trained model's.
    #[error("prediction input has {got} features, expected {expected}")]
    PredictionFeatureMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the prediction input.
        got: usize,
    },

    /// Returned when a class has fewer samples than the number of folds.
    #[error("class \"{class}\" has only {count} samples, need at least {n_folds} for stratified CV")]
    TooFewSamplesForFolds {
        /// The class label with insufficient samples.
        class: String,
        /// The number of samples belonging to that class.
        count: usize,
        /// The requested number of folds.
        n_folds: usize,
    },

    /// Returned when a class cannot land on both sides of a split.
    #[error("class \"{class}\" has only {count} samples, need at least 2 for a stratified split")]
    TooFewSamplesForSplit {
        /// The class label with insufficient samples.
        class: String,
        /// The number of samples belonging to that class.
        count: usize,
    },

    /// Returned when encoding a label the encoder never saw at fit time.
    #[error("unknown class label \"{label}\"")]
    UnknownLabel {
        /// The unrecognized label.
        label: String,
    },

    /// Returned when the underlying library rejects the training call.
    #[error("random forest training failed: {detail}")]
    Training {
        /// Library failure description.
        detail: String,
    },

    /// Returned when the underlying library rejects the prediction call.
    #[error("random forest prediction failed: {detail}")]
    Prediction {
        /// Library failure description.
        detail: String,
    },
}
