use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use motus_io::{PredictionWriter, RunName, TableReader};
use motus_model::{
    take_labels, take_rows, ConfusionMatrix, CrossValidation, ForestConfig, LabelEncoder,
    StratifiedSplit,
};
use motus_select::{
    drop_flagged, ensure_fully_populated, ensure_schema_match, near_zero_variance,
    select_aggregate_only, select_features, to_feature_matrix, to_training_matrix, Dataset,
    TrainingMatrix,
};

#[derive(Parser)]
#[command(name = "motus")]
#[command(about = "Sensor-based activity quality classification")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,
}

/// Shared model and partitioning parameters.
#[derive(Args, Debug, Clone)]
struct ModelArgs {
    /// Number of trees in the random forest
    #[arg(long, default_value_t = 100)]
    n_trees: u16,

    /// Maximum tree depth (unlimited if not set)
    #[arg(long)]
    max_depth: Option<u16>,

    /// Fraction of labeled rows used for training (stratified by class)
    #[arg(long, default_value_t = 0.7)]
    split_ratio: f64,

    /// Number of cross-validation folds
    #[arg(long, default_value_t = 4)]
    cv_folds: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Train on the labeled data and report cross-validated and held-out accuracy
    Evaluate {
        /// Path to the labeled CSV file
        #[arg(long)]
        training: PathBuf,

        /// Run name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        run: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Train full-feature and aggregate-only models on the same split and compare them
    Compare {
        /// Path to the labeled CSV file
        #[arg(long)]
        training: PathBuf,

        /// Run name for output files
        #[arg(long)]
        run: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Train on all labeled rows and write one prediction file per unlabeled row
    Predict {
        /// Path to the labeled CSV file
        #[arg(long)]
        training: PathBuf,

        /// Path to the unlabeled CSV file
        #[arg(long)]
        testing: PathBuf,

        /// Run name for output files
        #[arg(long)]
        run: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Number of trees in the random forest
        #[arg(long, default_value_t = 100)]
        n_trees: u16,

        /// Maximum tree depth (unlimited if not set)
        #[arg(long)]
        max_depth: Option<u16>,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct EvaluateOutput {
    run: String,
    n_samples: usize,
    n_features: usize,
    n_classes: usize,
    cv_mean_accuracy: f64,
    cv_std_accuracy: f64,
    holdout_accuracy: f64,
    holdout_kappa: f64,
    n_trees: u16,
}

#[derive(Serialize)]
struct CompareOutput {
    run: String,
    n_samples: usize,
    full_n_features: usize,
    full_holdout_accuracy: f64,
    aggregate_n_features: usize,
    aggregate_holdout_accuracy: f64,
}

#[derive(Serialize)]
struct PredictOutput {
    run: String,
    n_train: usize,
    n_features: usize,
    n_cases: usize,
    predictions: Vec<String>,
}

/// Read a CSV and reduce it to per-instant feature columns.
fn load_selected(path: &Path, labeled: bool) -> Result<Dataset> {
    let raw = TableReader::new(path)
        .read()
        .with_context(|| format!("failed to read {}", path.display()))?;
    let selected = select_features(&raw, labeled).context("feature selection failed")?;
    Ok(selected)
}

/// Run the near-zero-variance diagnostic and drop any feature column it
/// flags.
///
/// The trailing column of a labeled selection is the class label:
/// categorical and legitimately imbalanced, it is exempt from the drop.
/// Informative sensor columns never trip the cutoffs, so this is normally
/// a logged no-op; a flagged column means degenerate input worth knowing
/// about.
fn apply_nzv(selected: Dataset) -> Dataset {
    let mut reports = near_zero_variance(&selected);
    if let Some(label) = reports.last_mut() {
        label.flagged = false;
    }
    let flagged: Vec<&str> = reports
        .iter()
        .filter(|r| r.flagged)
        .map(|r| r.column.as_str())
        .collect();
    if flagged.is_empty() {
        info!("near-zero-variance check passed for all columns");
        selected
    } else {
        warn!(?flagged, "dropping near-zero-variance columns");
        drop_flagged(&selected, &reports)
    }
}

/// Shape a labeled dataset and encode its class labels.
fn shape_and_encode(selected: &Dataset) -> Result<(TrainingMatrix, LabelEncoder, Vec<u32>)> {
    ensure_fully_populated(selected).context("missing values survived filtering")?;
    let matrix = to_training_matrix(selected).context("failed to shape training matrix")?;
    let encoder = LabelEncoder::fit(matrix.labels());
    let encoded = encoder
        .encode(matrix.labels())
        .context("failed to encode class labels")?;
    Ok((matrix, encoder, encoded))
}

/// Train on the training side of a split and score the held-out side.
fn holdout_score(
    config: &ForestConfig,
    matrix: &TrainingMatrix,
    encoded: &[u32],
    encoder: &LabelEncoder,
    train_idx: &[usize],
    test_idx: &[usize],
) -> Result<ConfusionMatrix> {
    let forest = config
        .fit(
            &take_rows(matrix.features(), train_idx),
            &take_labels(encoded, train_idx),
        )
        .context("training failed")?;
    let predicted = forest
        .predict_batch(&take_rows(matrix.features(), test_idx))
        .context("held-out prediction failed")?;
    let cm = ConfusionMatrix::from_labels(
        &take_labels(encoded, test_idx),
        &predicted,
        encoder.classes(),
    )
    .context("failed to build confusion matrix")?;
    Ok(cm)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Evaluate {
            training,
            run,
            output_dir,
            model,
        } => {
            let run_name = RunName::new(run.clone())?;

            let selected = apply_nzv(load_selected(&training, true)?);
            let (matrix, encoder, encoded) = shape_and_encode(&selected)?;
            info!(
                n_samples = matrix.n_samples(),
                n_features = matrix.n_features(),
                "labeled dataset ready"
            );

            let split = StratifiedSplit::new(model.split_ratio)?.with_seed(cli.seed);
            let (train_idx, test_idx) = split.split(&encoded, &encoder)?;

            let config = ForestConfig::new(model.n_trees)?
                .with_max_depth(model.max_depth)
                .with_seed(cli.seed);

            // Cross-validate inside the training partition only; the
            // held-out rows stay untouched until the final score.
            let cv = CrossValidation::new(model.cv_folds)?.with_seed(cli.seed);
            let cv_result = cv
                .evaluate(
                    &config,
                    &take_rows(matrix.features(), &train_idx),
                    &take_labels(&encoded, &train_idx),
                    &encoder,
                )
                .context("cross-validation failed")?;

            let cm = holdout_score(&config, &matrix, &encoded, &encoder, &train_idx, &test_idx)?;
            info!(
                accuracy = cm.accuracy(),
                kappa = cm.kappa(),
                "held-out evaluation complete"
            );

            let stats: Vec<(f64, f64, f64, usize)> = cm
                .class_stats()
                .iter()
                .map(|s| (s.sensitivity, s.specificity, s.balanced_accuracy, s.support))
                .collect();
            let writer = PredictionWriter::new(&output_dir, run_name)?;
            writer.write_evaluation(
                cv_result.mean_accuracy,
                cv_result.std_accuracy,
                &cv_result.fold_accuracies,
                cm.accuracy(),
                cm.kappa(),
                encoder.classes(),
                &cm.as_rows(),
                &stats,
            )?;

            let output = EvaluateOutput {
                run,
                n_samples: matrix.n_samples(),
                n_features: matrix.n_features(),
                n_classes: encoder.n_classes(),
                cv_mean_accuracy: cv_result.mean_accuracy,
                cv_std_accuracy: cv_result.std_accuracy,
                holdout_accuracy: cm.accuracy(),
                holdout_kappa: cm.kappa(),
                n_trees: model.n_trees,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Compare {
            training,
            run,
            output_dir,
            model,
        } => {
            let run_name = RunName::new(run.clone())?;

            let selected = apply_nzv(load_selected(&training, true)?);
            let aggregate =
                select_aggregate_only(&selected).context("aggregate-only selection failed")?;

            let (full_matrix, encoder, encoded) = shape_and_encode(&selected)?;
            let (agg_matrix, _, _) = shape_and_encode(&aggregate)?;

            // One split reused for both models, so the comparison scores
            // the same held-out rows on each side.
            let split = StratifiedSplit::new(model.split_ratio)?.with_seed(cli.seed);
            let (train_idx, test_idx) = split.split(&encoded, &encoder)?;

            let config = ForestConfig::new(model.n_trees)?
                .with_max_depth(model.max_depth)
                .with_seed(cli.seed);

            let full_cm = holdout_score(
                &config,
                &full_matrix,
                &encoded,
                &encoder,
                &train_idx,
                &test_idx,
            )?;
            let agg_cm = holdout_score(
                &config,
                &agg_matrix,
                &encoded,
                &encoder,
                &train_idx,
                &test_idx,
            )?;
            info!(
                full_accuracy = full_cm.accuracy(),
                aggregate_accuracy = agg_cm.accuracy(),
                "model comparison complete"
            );

            let writer = PredictionWriter::new(&output_dir, run_name)?;
            writer.write_comparison(
                full_matrix.n_features(),
                full_cm.accuracy(),
                agg_matrix.n_features(),
                agg_cm.accuracy(),
            )?;

            let output = CompareOutput {
                run,
                n_samples: full_matrix.n_samples(),
                full_n_features: full_matrix.n_features(),
                full_holdout_accuracy: full_cm.accuracy(),
                aggregate_n_features: agg_matrix.n_features(),
                aggregate_holdout_accuracy: agg_cm.accuracy(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Predict {
            training,
            testing,
            run,
            output_dir,
            n_trees,
            max_depth,
        } => {
            let run_name = RunName::new(run.clone())?;

            // 1. Load and filter both populations with the same rules.
            let labeled = load_selected(&training, true)?;
            let unlabeled = load_selected(&testing, false)?;

            // 2. The two datasets must agree on the feature schema, and
            // the prediction population must be fully populated.
            ensure_schema_match(&labeled, &unlabeled)
                .context("labeled and unlabeled schemas disagree")?;
            ensure_fully_populated(&unlabeled)
                .context("missing values survived filtering in the unlabeled data")?;

            // 3. Shape and train on every labeled row.
            let (matrix, encoder, encoded) = shape_and_encode(&labeled)?;
            let config = ForestConfig::new(n_trees)?
                .with_max_depth(max_depth)
                .with_seed(cli.seed);
            let forest = config
                .fit(matrix.features(), &encoded)
                .context("training failed")?;

            // 4. Predict and decode back to class labels.
            let features = to_feature_matrix(&unlabeled)
                .context("failed to shape unlabeled feature matrix")?;
            let predicted_idx = forest
                .predict_batch(features.features())
                .context("prediction failed")?;
            let predicted = encoder.decode_batch(&predicted_idx);

            // 5. One flat file per case plus the JSON summary.
            let writer = PredictionWriter::new(&output_dir, run_name)?;
            writer.write_case_files(&predicted)?;
            writer.write_predictions(&predicted)?;

            let output = PredictOutput {
                run,
                n_train: matrix.n_samples(),
                n_features: matrix.n_features(),
                n_cases: predicted.len(),
                predictions: predicted,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
