use std::path::PathBuf;

use datafusion::arrow::error::ArrowError;
use datafusion::error::DataFusionError;

use promoflow_db::SinkError;

/// Stage-fatal failures. Each aborts the remaining stages of a run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Workbook {0} has no sheets")]
    EmptyWorkbook(PathBuf),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Query engine error: {0}")]
    Engine(#[from] DataFusionError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    #[error("Column sets differ: missing {missing:?}, unexpected {unexpected:?}")]
    SchemaMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("Column {0} not found in result set")]
    MissingColumn(String),

    #[error("Invalid value in column {column}: {reason}")]
    InvalidValue { column: String, reason: String },

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}
