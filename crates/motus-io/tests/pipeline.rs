//! End-to-end integration tests: CSV -> select -> check -> shape -> write.

use std::fs;
use std::path::Path;

use motus_io::{PredictionWriter, RunName, TableReader};
use motus_select::{
    ensure_fully_populated, ensure_schema_match, select_features, to_feature_matrix,
    to_training_matrix,
};
use tempfile::TempDir;

/// Path to the test fixture directory.
fn fixture_path(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn labeled_fixture_selects_and_shapes() {
    // 1. Read: missing tokens (NA, #DIV/0!, empty) must normalize on load.
    let raw = TableReader::new(&fixture_path("labeled_small.csv"))
        .read()
        .expect("fixture should parse");
    assert_eq!(raw.n_rows(), 10);
    assert_eq!(raw.n_cols(), 17);

    // 2. Select: 2 aggregate columns and 7 metadata columns out.
    let selected = select_features(&raw, true).unwrap();
    assert_eq!(
        selected.columns(),
        &[
            "roll_belt".to_string(),
            "pitch_belt".to_string(),
            "yaw_belt".to_string(),
            "total_accel_belt".to_string(),
            "gyros_arm_x".to_string(),
            "accel_arm_y".to_string(),
            "magnet_dumbbell_z".to_string(),
            "classe".to_string(),
        ]
    );

    // 3. The aggregate columns held every missing value; the rest is clean.
    ensure_fully_populated(&selected).unwrap();

    // 4. Shape for training.
    let matrix = to_training_matrix(&selected).unwrap();
    assert_eq!(matrix.n_samples(), 10);
    assert_eq!(matrix.n_features(), 7);
    assert_eq!(matrix.labels()[0], "A");
    assert_eq!(matrix.labels()[9], "E");
    assert!((matrix.features()[0][0] - 1.41).abs() < 1e-9);
}

#[test]
fn labeled_and_unlabeled_schemas_agree() {
    let labeled = select_features(
        &TableReader::new(&fixture_path("labeled_small.csv"))
            .read()
            .unwrap(),
        true,
    )
    .unwrap();
    let unlabeled = select_features(
        &TableReader::new(&fixture_path("unlabeled_small.csv"))
            .read()
            .unwrap(),
        false,
    )
    .unwrap();

    ensure_schema_match(&labeled, &unlabeled).unwrap();
    ensure_fully_populated(&unlabeled).unwrap();

    let matrix = to_feature_matrix(&unlabeled).unwrap();
    assert_eq!(matrix.n_samples(), 2);
    assert_eq!(matrix.feature_names().len(), 7);
}

#[test]
fn predictions_round_trip_to_case_files() {
    let dir = TempDir::new().unwrap();
    let writer = PredictionWriter::new(dir.path(), RunName::new("rt".into()).unwrap()).unwrap();

    let predicted = vec!["B".to_string(), "A".to_string()];
    writer.write_case_files(&predicted).unwrap();
    writer.write_predictions(&predicted).unwrap();

    // Flat files: one token per 1-based case index.
    assert_eq!(fs::read_to_string(dir.path().join("case_1.txt")).unwrap(), "B\n");
    assert_eq!(fs::read_to_string(dir.path().join("case_2.txt")).unwrap(), "A\n");

    // JSON artifact mirrors the same order.
    let content: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("rt_predict.json")).unwrap())
            .unwrap();
    assert_eq!(content["n_cases"], 2);
    assert_eq!(content["predictions"][0]["label"], "B");
    assert_eq!(content["predictions"][1]["label"], "A");
}
