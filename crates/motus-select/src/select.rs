//! Feature selection stages.

use tracing::{debug, info, instrument};

use crate::rule::{apply_rules, derived_sensor_rules, window_aggregate_rules};
use crate::{Dataset, SelectError};

/// Number of leading identifier/timestamp/window-metadata columns dropped
/// by [`select_features`]. These carry no generalizable predictive signal.
pub const LEADING_METADATA_COLUMNS: usize = 7;

/// Reduce a raw dataset to its per-instant feature columns.
///
/// Three stages, each preserving relative column order:
///
/// 1. Drop every column whose name starts with a window-aggregate prefix
///    (`kurtosis`, `skewness`, `max`, `min`, `amplitude`, `var`, `avg`,
///    `stddev`). These are populated only on window-summary rows.
/// 2. Drop the first [`LEADING_METADATA_COLUMNS`] remaining columns
///    (identifiers, timestamps, window metadata).
/// 3. If `labeled` is false, drop the trailing column — an opaque case
///    identifier, neither a feature nor the label.
///
/// Pure transformation; the input is not modified.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`SelectError::ConventionMismatch`] | No column matched any aggregate prefix |
/// | [`SelectError::TooFewColumns`] | Fewer than 8 columns remain after stage 1 |
#[instrument(skip(dataset), fields(n_cols = dataset.n_cols(), labeled))]
pub fn select_features(dataset: &Dataset, labeled: bool) -> Result<Dataset, SelectError> {
    // Stage 1: window-aggregate columns out.
    let rules = window_aggregate_rules();
    let (keep, matched) = apply_rules(dataset.columns(), &rules);
    if matched == 0 {
        return Err(SelectError::ConventionMismatch {
            prefixes: rules.iter().map(|r| r.prefix).collect(),
        });
    }
    let reduced = dataset.retain_columns(&keep);
    debug!(dropped = matched, "window-aggregate columns removed");

    // Stage 2: leading metadata columns out.
    if reduced.n_cols() <= LEADING_METADATA_COLUMNS {
        return Err(SelectError::TooFewColumns {
            remaining: reduced.n_cols(),
            required: LEADING_METADATA_COLUMNS,
        });
    }
    let keep: Vec<bool> = (0..reduced.n_cols())
        .map(|i| i >= LEADING_METADATA_COLUMNS)
        .collect();
    let mut reduced = reduced.retain_columns(&keep);

    // Stage 3: trailing case identifier out for unlabeled data.
    if !labeled {
        let last = reduced.n_cols() - 1;
        let keep: Vec<bool> = (0..reduced.n_cols()).map(|i| i != last).collect();
        reduced = reduced.retain_columns(&keep);
    }

    info!(
        n_cols_in = dataset.n_cols(),
        n_cols_out = reduced.n_cols(),
        "feature selection complete"
    );
    Ok(reduced)
}

/// Reduce a [`select_features`] output to aggregate sensor readings only.
///
/// Drops every column starting with `gyros`, `accel`, or `magnet`,
/// retaining `total`/`roll`/`pitch`/`yaw` columns (plus the label column if
/// present). Used to compare a lean model against the full-feature model.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`SelectError::ConventionMismatch`] | No column matched any derived-sensor prefix |
#[instrument(skip(dataset), fields(n_cols = dataset.n_cols()))]
pub fn select_aggregate_only(dataset: &Dataset) -> Result<Dataset, SelectError> {
    let rules = derived_sensor_rules();
    let (keep, matched) = apply_rules(dataset.columns(), &rules);
    if matched == 0 {
        return Err(SelectError::ConventionMismatch {
            prefixes: rules.iter().map(|r| r.prefix).collect(),
        });
    }
    let reduced = dataset.retain_columns(&keep);
    info!(
        n_cols_in = dataset.n_cols(),
        n_cols_out = reduced.n_cols(),
        "aggregate-only selection complete"
    );
    Ok(reduced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cell;

    /// A 14-column labeled layout in the sensor-export naming convention.
    fn labeled_14() -> Dataset {
        let columns: Vec<String> = [
            "id", "ts1", "ts2", "ts3", "ts4", "ts5", "ts6", "kurtosis_x", "max_x", "roll_belt",
            "gyros_arm_x", "accel_forearm_y", "magnet_belt_z", "classe",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let row: Vec<Cell> = (0..13)
            .map(|i| Cell::Number(i as f64))
            .chain(std::iter::once(Cell::Text("A".into())))
            .collect();
        Dataset::new(columns, vec![row]).unwrap()
    }

    /// Same layout minus `classe`, plus a trailing `problem_id`.
    fn unlabeled_14() -> Dataset {
        let columns: Vec<String> = [
            "id", "ts1", "ts2", "ts3", "ts4", "ts5", "ts6", "kurtosis_x", "max_x", "roll_belt",
            "gyros_arm_x", "accel_forearm_y", "magnet_belt_z", "problem_id",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let row: Vec<Cell> = (0..14).map(|i| Cell::Number(i as f64)).collect();
        Dataset::new(columns, vec![row]).unwrap()
    }

    #[test]
    fn labeled_layout_keeps_five_columns_in_order() {
        let out = select_features(&labeled_14(), true).unwrap();
        assert_eq!(
            out.columns(),
            &[
                "roll_belt".to_string(),
                "gyros_arm_x".to_string(),
                "accel_forearm_y".to_string(),
                "magnet_belt_z".to_string(),
                "classe".to_string(),
            ]
        );
    }

    #[test]
    fn unlabeled_layout_drops_trailing_case_id() {
        let out = select_features(&unlabeled_14(), false).unwrap();
        assert_eq!(
            out.columns(),
            &[
                "roll_belt".to_string(),
                "gyros_arm_x".to_string(),
                "accel_forearm_y".to_string(),
                "magnet_belt_z".to_string(),
            ]
        );
    }

    #[test]
    fn no_excluded_prefix_survives() {
        let out = select_features(&labeled_14(), true).unwrap();
        let excluded = [
            "kurtosis", "skewness", "max", "min", "amplitude", "var", "avg", "stddev",
        ];
        for name in out.columns() {
            assert!(
                excluded.iter().all(|p| !name.starts_with(p)),
                "column {name} kept despite excluded prefix"
            );
        }
    }

    #[test]
    fn column_count_arithmetic_labeled() {
        let input = labeled_14();
        let n_aggregate = 2; // kurtosis_x, max_x
        let out = select_features(&input, true).unwrap();
        assert_eq!(
            out.n_cols(),
            input.n_cols() - n_aggregate - LEADING_METADATA_COLUMNS
        );
    }

    #[test]
    fn column_count_arithmetic_unlabeled() {
        let input = unlabeled_14();
        let n_aggregate = 2;
        let out = select_features(&input, false).unwrap();
        assert_eq!(
            out.n_cols(),
            input.n_cols() - n_aggregate - LEADING_METADATA_COLUMNS - 1
        );
    }

    #[test]
    fn convention_mismatch_fails_loudly() {
        let ds = Dataset::new(
            (0..10).map(|i| format!("col_{i}")).collect(),
            vec![],
        )
        .unwrap();
        let err = select_features(&ds, true).unwrap_err();
        assert!(matches!(err, SelectError::ConventionMismatch { .. }));
    }

    #[test]
    fn too_few_columns_after_aggregate_drop() {
        // 8 columns, one of them aggregate: 7 remain, nothing left to keep.
        let columns: Vec<String> = [
            "id", "ts1", "ts2", "ts3", "ts4", "ts5", "kurtosis_x", "new_window",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let ds = Dataset::new(columns, vec![]).unwrap();
        let err = select_features(&ds, true).unwrap_err();
        assert!(matches!(err, SelectError::TooFewColumns { remaining: 7, .. }));
    }

    #[test]
    fn aggregate_only_keeps_orientation_columns_and_label() {
        let selected = select_features(&labeled_14(), true).unwrap();
        let out = select_aggregate_only(&selected).unwrap();
        assert_eq!(
            out.columns(),
            &["roll_belt".to_string(), "classe".to_string()]
        );
        assert!(out.n_cols() < selected.n_cols());
    }

    #[test]
    fn aggregate_only_convention_mismatch() {
        let ds = Dataset::new(vec!["roll_belt".into(), "classe".into()], vec![]).unwrap();
        let err = select_aggregate_only(&ds).unwrap_err();
        assert!(matches!(err, SelectError::ConventionMismatch { .. }));
    }

    #[test]
    fn selection_is_idempotent_on_its_own_output() {
        // Literal re-application is impossible by contract: a reduced
        // dataset matches no aggregate prefix, which is a hard error.
        // Stability is checked instead by re-padding the output with
        // metadata and aggregate columns and confirming a second pass
        // reproduces it exactly.
        let first = select_features(&labeled_14(), true).unwrap();
        let mut columns: Vec<String> = (0..7).map(|i| format!("meta_{i}")).collect();
        columns.push("kurtosis_y".into());
        columns.extend(first.columns().iter().cloned());
        let rows = first
            .rows()
            .iter()
            .map(|row| {
                let mut padded: Vec<Cell> = (0..8).map(|_| Cell::Missing).collect();
                padded.extend(row.iter().cloned());
                padded
            })
            .collect();
        let padded = Dataset::new(columns, rows).unwrap();
        let second = select_features(&padded, true).unwrap();
        assert_eq!(second.columns(), first.columns());
        assert_eq!(second.rows(), first.rows());
    }
}
