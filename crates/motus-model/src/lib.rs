//! Random-forest training, splitting, cross-validation, and evaluation.
//!
//! The tree-ensemble algorithm itself is smartcore's; this crate wraps it
//! with validated configuration, string-label encoding, seeded stratified
//! splitting, k-fold cross-validation, and confusion-matrix reporting.

mod config;
mod confusion;
mod cv;
mod error;
mod forest;
mod labels;
mod split;

pub use config::ForestConfig;
pub use confusion::{ClassStats, ConfusionMatrix};
pub use cv::{CrossValidation, CrossValidationResult};
pub use error::ModelError;
pub use forest::Forest;
pub use labels::LabelEncoder;
pub use split::{take_labels, take_rows, StratifiedSplit};
