//! Accuracy regression tests for motus-model.
//!
//! Verify that the wrapped forest, the stratified split, and
//! cross-validation keep their accuracy on a deterministic synthetic
//! dataset shaped like the sensor problem (5 classes, informative plus
//! noise features).

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use motus_model::{
    take_labels, take_rows, ConfusionMatrix, CrossValidation, ForestConfig, LabelEncoder,
    StratifiedSplit,
};

/// Generate a 500-sample, 12-feature, 5-class dataset.
///
/// Features 0-3 are informative (class * 4.0 + noise in [0, 0.5]);
/// the rest are pure noise. Classes are assigned round-robin.
fn make_classification() -> (Vec<Vec<f64>>, Vec<String>) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let class_names = ["A", "B", "C", "D", "E"];
    let mut features = Vec::with_capacity(500);
    let mut labels = Vec::with_capacity(500);
    for i in 0..500 {
        let class = i % class_names.len();
        labels.push(class_names[class].to_string());
        let row: Vec<f64> = (0..12)
            .map(|f| {
                let base = if f < 4 { class as f64 * 4.0 } else { 0.0 };
                base + rng.gen::<f64>() * 0.5
            })
            .collect();
        features.push(row);
    }
    (features, labels)
}

/// Held-out accuracy after a 70/30 stratified split must exceed 0.9.
#[test]
fn holdout_accuracy_above_threshold() {
    let (features, labels) = make_classification();
    let encoder = LabelEncoder::fit(&labels);
    let encoded = encoder.encode(&labels).unwrap();

    let split = StratifiedSplit::new(0.7).unwrap().with_seed(42);
    let (train_idx, test_idx) = split.split(&encoded, &encoder).unwrap();

    let forest = ForestConfig::new(100)
        .unwrap()
        .with_seed(42)
        .fit(
            &take_rows(&features, &train_idx),
            &take_labels(&encoded, &train_idx),
        )
        .unwrap();

    let predicted = forest
        .predict_batch(&take_rows(&features, &test_idx))
        .unwrap();
    let cm = ConfusionMatrix::from_labels(
        &take_labels(&encoded, &test_idx),
        &predicted,
        encoder.classes(),
    )
    .unwrap();

    assert!(cm.accuracy() > 0.9, "holdout accuracy {}", cm.accuracy());
    assert!(cm.kappa() > 0.85, "holdout kappa {}", cm.kappa());
}

/// 4-fold cross-validation mean accuracy must exceed 0.9.
#[test]
fn cv_accuracy_above_threshold() {
    let (features, labels) = make_classification();
    let encoder = LabelEncoder::fit(&labels);
    let encoded = encoder.encode(&labels).unwrap();

    let cfg = ForestConfig::new(100).unwrap().with_seed(42);
    let cv = CrossValidation::new(4).unwrap().with_seed(42);
    let result = cv.evaluate(&cfg, &features, &encoded, &encoder).unwrap();

    assert!(
        result.mean_accuracy > 0.9,
        "cv mean_accuracy {} <= 0.9",
        result.mean_accuracy
    );
    assert_eq!(result.fold_accuracies.len(), 4);
    assert!(result.std_accuracy < 0.2);
}

/// Same seed must reproduce the same split and the same predictions.
#[test]
fn seeded_run_is_reproducible() {
    let (features, labels) = make_classification();
    let encoder = LabelEncoder::fit(&labels);
    let encoded = encoder.encode(&labels).unwrap();

    let run = |seed: u64| {
        let split = StratifiedSplit::new(0.7).unwrap().with_seed(seed);
        let (train_idx, test_idx) = split.split(&encoded, &encoder).unwrap();
        let forest = ForestConfig::new(30)
            .unwrap()
            .with_seed(seed)
            .fit(
                &take_rows(&features, &train_idx),
                &take_labels(&encoded, &train_idx),
            )
            .unwrap();
        forest
            .predict_batch(&take_rows(&features, &test_idx))
            .unwrap()
    };

    assert_eq!(run(7), run(7));
}
