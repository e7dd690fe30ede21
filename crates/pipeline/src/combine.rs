use std::collections::BTreeSet;

use crate::dataset::Dataset;
use crate::error::PipelineError;

/// Stack `second` under `first`, matching columns by name.
///
/// Both datasets must carry the same set of column names. Rows of `second`
/// are reordered into `first`'s column order; row order is preserved.
pub fn combine(first: &Dataset, second: &Dataset) -> Result<Dataset, PipelineError> {
    let expected = first.column_names();
    let actual = second.column_names();

    let expected_set: BTreeSet<&String> = expected.iter().collect();
    let actual_set: BTreeSet<&String> = actual.iter().collect();
    if expected_set != actual_set {
        let err = PipelineError::SchemaMismatch {
            missing: expected_set.difference(&actual_set).map(|c| c.to_string()).collect(),
            unexpected: actual_set.difference(&expected_set).map(|c| c.to_string()).collect(),
        };
        tracing::error!(first = first.name(), second = second.name(), error = %err, "Cannot combine datasets");
        return Err(err);
    }

    let columns: Vec<&str> = expected.iter().map(String::as_str).collect();
    let aligned = second.frame().clone().select_columns(&columns)?;
    let frame = first.frame().clone().union(aligned)?;

    tracing::info!(first = first.name(), second = second.name(), "Datasets combined");
    Ok(Dataset::new(format!("{}+{}", first.name(), second.name()), frame))
}
