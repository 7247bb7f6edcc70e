//! Output writing: per-case prediction files and JSON artifacts.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::domain::RunName;
use crate::IoError;

/// Writes predictions and evaluation results under an output directory.
///
/// Creates the output directory on construction if it does not exist.
/// Per-case files are named `case_{i}.txt` (1-based row index); JSON
/// artifacts are named `{run}_predict.json`, `{run}_evaluate.json`, and
/// `{run}_compare.json`.
pub struct PredictionWriter {
    output_dir: PathBuf,
    run: RunName,
}

impl PredictionWriter {
    /// Create a new writer targeting the given directory and run name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), run = %run))]
    pub fn new(output_dir: &Path, run: RunName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            run,
        })
    }

    /// Write one flat text file per predicted case.
    ///
    /// File `case_{i}.txt` (1-based `i`) holds exactly one unquoted token —
    /// the predicted label for row `i` — with no header and no row or
    /// column labels.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] for the first file that cannot be written.
    #[instrument(skip_all, fields(n_cases = predicted.len()))]
    pub fn write_case_files(&self, predicted: &[String]) -> Result<(), IoError> {
        for (index, label) in predicted.iter().enumerate() {
            let path = self.output_dir.join(format!("case_{}.txt", index + 1));
            fs::write(&path, format!("{label}\n")).map_err(|e| IoError::WriteFile {
                path: path.clone(),
                source: e,
            })?;
        }
        info!(n_cases = predicted.len(), "per-case prediction files written");
        Ok(())
    }

    /// Write the prediction summary to `{run}_predict.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] if the file cannot be written.
    #[instrument(skip_all)]
    pub fn write_predictions(&self, predicted: &[String]) -> Result<(), IoError> {
        let path = self
            .output_dir
            .join(format!("{}_predict.json", self.run.as_str()));

        let cases: Vec<CaseEntry> = predicted
            .iter()
            .enumerate()
            .map(|(index, label)| CaseEntry {
                case: index + 1,
                label,
            })
            .collect();

        let artifact = PredictArtifact {
            run: self.run.as_str(),
            n_cases: predicted.len(),
            predictions: cases,
        };
        self.write_json(&path, &artifact)?;
        info!(path = %path.display(), "predictions written");
        Ok(())
    }

    /// Write evaluation results to `{run}_evaluate.json`.
    ///
    /// Uses shadow structs fed with primitives — the writer has no
    /// dependency on `motus-model`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] if the file cannot be written.
    #[allow(clippy::too_many_arguments)]
    #[instrument(skip_all)]
    pub fn write_evaluation(
        &self,
        cv_accuracy_mean: f64,
        cv_accuracy_std: f64,
        fold_accuracies: &[f64],
        holdout_accuracy: f64,
        holdout_kappa: f64,
        class_names: &[String],
        confusion_matrix: &[Vec<usize>],
        class_stats: &[(f64, f64, f64, usize)], // (sensitivity, specificity, balanced_accuracy, support)
    ) -> Result<(), IoError> {
        let path = self
            .output_dir
            .join(format!("{}_evaluate.json", self.run.as_str()));

        let classes: Vec<ClassEntry> = class_names
            .iter()
            .zip(class_stats.iter())
            .map(
                |(name, &(sensitivity, specificity, balanced_accuracy, support))| ClassEntry {
                    class: name.as_str(),
                    sensitivity,
                    specificity,
                    balanced_accuracy,
                    support,
                },
            )
            .collect();

        let artifact = EvaluateArtifact {
            run: self.run.as_str(),
            cv_accuracy_mean,
            cv_accuracy_std,
            fold_accuracies,
            holdout_accuracy,
            holdout_kappa,
            class_names,
            confusion_matrix,
            class_stats: classes,
        };
        self.write_json(&path, &artifact)?;
        info!(path = %path.display(), "evaluation written");
        Ok(())
    }

    /// Write a model-comparison result to `{run}_compare.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] if the file cannot be written.
    #[instrument(skip_all)]
    pub fn write_comparison(
        &self,
        full_n_features: usize,
        full_accuracy: f64,
        aggregate_n_features: usize,
        aggregate_accuracy: f64,
    ) -> Result<(), IoError> {
        let path = self
            .output_dir
            .join(format!("{}_compare.json", self.run.as_str()));

        let artifact = CompareArtifact {
            run: self.run.as_str(),
            full_model: ModelEntry {
                n_features: full_n_features,
                holdout_accuracy: full_accuracy,
            },
            aggregate_model: ModelEntry {
                n_features: aggregate_n_features,
                holdout_accuracy: aggregate_accuracy,
            },
        };
        self.write_json(&path, &artifact)?;
        info!(path = %path.display(), "comparison written");
        Ok(())
    }

    fn write_json<T: Serialize>(&self, path: &Path, artifact: &T) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(artifact).expect("serialization cannot fail");
        fs::write(path, &json).map_err(|e| IoError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

// --- Shadow structs for JSON serialization ---

#[derive(Serialize)]
struct PredictArtifact<'a> {
    run: &'a str,
    n_cases: usize,
    predictions: Vec<CaseEntry<'a>>,
}

#[derive(Serialize)]
struct CaseEntry<'a> {
    case: usize,
    label: &'a str,
}

#[derive(Serialize)]
struct EvaluateArtifact<'a> {
    run: &'a str,
    cv_accuracy_mean: f64,
    cv_accuracy_std: f64,
    fold_accuracies: &'a [f64],
    holdout_accuracy: f64,
    holdout_kappa: f64,
    class_names: &'a [String],
    confusion_matrix: &'a [Vec<usize>],
    class_stats: Vec<ClassEntry<'a>>,
}

#[derive(Serialize)]
struct ClassEntry<'a> {
    class: &'a str,
    sensitivity: f64,
    specificity: f64,
    balanced_accuracy: f64,
    support: usize,
}

#[derive(Serialize)]
struct CompareArtifact<'a> {
    run: &'a str,
    full_model: ModelEntry,
    aggregate_model: ModelEntry,
}

#[derive(Serialize)]
struct ModelEntry {
    n_features: usize,
    holdout_accuracy: f64,
}
