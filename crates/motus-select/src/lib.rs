//! Column classification, feature selection, and dataset shaping.
//!
//! Provides the dataset domain type, prefix-rule column filtering,
//! the near-zero-variance diagnostic, schema and population checks,
//! and dense-matrix shaping for the model layer.

mod dataset;
mod error;
mod nzv;
mod rule;
mod schema;
mod select;
mod shape;

pub use dataset::{Cell, Dataset};
pub use error::SelectError;
pub use nzv::{drop_flagged, near_zero_variance, NzvReport};
pub use rule::{derived_sensor_rules, window_aggregate_rules, FilterRule, Retention};
pub use schema::{ensure_fully_populated, ensure_schema_match};
pub use select::{select_aggregate_only, select_features, LEADING_METADATA_COLUMNS};
pub use shape::{to_feature_matrix, to_training_matrix, FeatureMatrix, TrainingMatrix};
