//! Cross-dataset consistency checks run between filtering and training.

use tracing::{info, instrument};

use crate::{Dataset, SelectError};

/// Verify that every cell of every retained column is populated.
///
/// The selector's contract is that its output is fully populated for the
/// population being predicted over; a missing value past this point would
/// reach the classifier, which cannot score rows with missing features.
///
/// # Errors
///
/// Returns [`SelectError::MissingValueLeakage`] for the first missing cell.
#[instrument(skip(dataset), fields(n_cols = dataset.n_cols(), n_rows = dataset.n_rows()))]
pub fn ensure_fully_populated(dataset: &Dataset) -> Result<(), SelectError> {
    for (col_index, name) in dataset.columns().iter().enumerate() {
        for (row_index, cell) in dataset.column(col_index).enumerate() {
            if cell.is_missing() {
                return Err(SelectError::MissingValueLeakage {
                    column: name.clone(),
                    row_index,
                });
            }
        }
    }
    info!("no missing values in retained columns");
    Ok(())
}

/// Verify that the labeled and unlabeled datasets agree on the filtered
/// feature schema.
///
/// The labeled dataset's trailing label column is excluded from the
/// comparison; the remaining column names must match the unlabeled
/// dataset's columns exactly, in order. A model trained on one schema
/// cannot be trusted against another.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`SelectError::EmptyDataset`] | The labeled dataset has no columns |
/// | [`SelectError::SchemaDrift`] | First position where the schemas disagree |
#[instrument(skip_all, fields(labeled_cols = labeled.n_cols(), unlabeled_cols = unlabeled.n_cols()))]
pub fn ensure_schema_match(labeled: &Dataset, unlabeled: &Dataset) -> Result<(), SelectError> {
    if labeled.n_cols() == 0 {
        return Err(SelectError::EmptyDataset);
    }
    let features = &labeled.columns()[..labeled.n_cols() - 1];
    let other = unlabeled.columns();

    let longest = features.len().max(other.len());
    for position in 0..longest {
        let left = features.get(position);
        let right = other.get(position);
        if left != right {
            return Err(SelectError::SchemaDrift {
                position,
                labeled: left.cloned().unwrap_or_else(|| "<absent>".to_string()),
                unlabeled: right.cloned().unwrap_or_else(|| "<absent>".to_string()),
            });
        }
    }
    info!(n_features = features.len(), "schemas agree");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cell;

    fn dataset(columns: &[&str], rows: Vec<Vec<Cell>>) -> Dataset {
        Dataset::new(columns.iter().map(|s| s.to_string()).collect(), rows).unwrap()
    }

    #[test]
    fn populated_dataset_passes() {
        let ds = dataset(
            &["a", "b"],
            vec![vec![Cell::Number(1.0), Cell::Text("A".into())]],
        );
        assert!(ensure_fully_populated(&ds).is_ok());
    }

    #[test]
    fn missing_cell_is_reported_with_location() {
        let ds = dataset(
            &["a", "b"],
            vec![
                vec![Cell::Number(1.0), Cell::Number(2.0)],
                vec![Cell::Number(3.0), Cell::Missing],
            ],
        );
        let err = ensure_fully_populated(&ds).unwrap_err();
        assert!(matches!(
            err,
            SelectError::MissingValueLeakage { ref column, row_index: 1 } if column == "b"
        ));
    }

    #[test]
    fn matching_schemas_pass() {
        let labeled = dataset(&["roll_belt", "yaw_arm", "classe"], vec![]);
        let unlabeled = dataset(&["roll_belt", "yaw_arm"], vec![]);
        assert!(ensure_schema_match(&labeled, &unlabeled).is_ok());
    }

    #[test]
    fn name_disagreement_is_drift() {
        let labeled = dataset(&["roll_belt", "yaw_arm", "classe"], vec![]);
        let unlabeled = dataset(&["roll_belt", "yaw_dumbbell"], vec![]);
        let err = ensure_schema_match(&labeled, &unlabeled).unwrap_err();
        assert!(matches!(err, SelectError::SchemaDrift { position: 1, .. }));
    }

    #[test]
    fn extra_unlabeled_column_is_drift() {
        let labeled = dataset(&["roll_belt", "classe"], vec![]);
        let unlabeled = dataset(&["roll_belt", "yaw_arm"], vec![]);
        let err = ensure_schema_match(&labeled, &unlabeled).unwrap_err();
        assert!(matches!(
            err,
            SelectError::SchemaDrift { position: 1, ref labeled, .. } if labeled == "<absent>"
        ));
    }

    #[test]
    fn order_disagreement_is_drift() {
        let labeled = dataset(&["yaw_arm", "roll_belt", "classe"], vec![]);
        let unlabeled = dataset(&["roll_belt", "yaw_arm"], vec![]);
        let err = ensure_schema_match(&labeled, &unlabeled).unwrap_err();
        assert!(matches!(err, SelectError::SchemaDrift { position: 0, .. }));
    }
}
