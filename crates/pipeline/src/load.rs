//! CSV loader with schema inference.

use std::path::Path;

use datafusion::prelude::CsvReadOptions;

use crate::dataset::Dataset;
use crate::engine::EngineSession;
use crate::error::PipelineError;

/// Read a headered CSV file into a dataset named after the file.
///
/// Column types are inferred from the values; there is no explicit schema.
pub async fn load_csv(session: &EngineSession, path: &Path) -> Result<Dataset, PipelineError> {
    tracing::info!(path = %path.display(), "Loading CSV");
    let result = read(session, path).await;
    if let Err(e) = &result {
        tracing::error!(path = %path.display(), error = ?e, "Failed to load CSV");
    }
    result
}

async fn read(session: &EngineSession, path: &Path) -> Result<Dataset, PipelineError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let location = path.to_string_lossy();
    let frame = session
        .context()
        .read_csv(location.as_ref(), CsvReadOptions::new().has_header(true))
        .await?;
    let dataset = Dataset::new(name, frame);

    let rows = dataset.row_count().await?;
    tracing::info!(
        dataset = dataset.name(),
        rows,
        columns = dataset.column_count(),
        "Loaded CSV dataset",
    );
    Ok(dataset)
}
