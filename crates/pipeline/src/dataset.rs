//! Named tabular dataset backed by a lazy engine plan.

use datafusion::arrow::record_batch::RecordBatch;
use datafusion::prelude::DataFrame;

use crate::error::PipelineError;

/// A named, ordered collection of typed rows.
///
/// Stages never mutate a dataset; they return a new one.
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    frame: DataFrame,
}

impl Dataset {
    pub fn new(name: impl Into<String>, frame: DataFrame) -> Self {
        Self {
            name: name.into(),
            frame,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Column names in schema order.
    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    pub fn column_count(&self) -> usize {
        self.frame.schema().fields().len()
    }

    pub async fn row_count(&self) -> Result<usize, PipelineError> {
        Ok(self.frame.clone().count().await?)
    }

    /// Execute the plan and materialize every row.
    pub async fn collect(&self) -> Result<Vec<RecordBatch>, PipelineError> {
        Ok(self.frame.clone().collect().await?)
    }

    /// Render up to `limit` rows as a text table.
    pub async fn preview(&self, limit: usize) -> Result<String, PipelineError> {
        let batches = self.frame.clone().limit(0, Some(limit))?.collect().await?;
        Ok(datafusion::arrow::util::pretty::pretty_format_batches(&batches)?.to_string())
    }
}
