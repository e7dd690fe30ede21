//! Query engine session.
//!
//! One [`EngineSession`] is started per run and shared by every load,
//! validation and transform. It owns the DataFusion context, the custom
//! scalar functions the transform query relies on, and the set of views
//! registered during the run.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use datafusion::arrow::array::{Array, ArrayRef, Date32Array};
use datafusion::arrow::compute::cast;
use datafusion::arrow::datatypes::DataType;
use datafusion::common::cast::as_int64_array;
use datafusion::common::TableReference;
use datafusion::logical_expr::{create_udf, ColumnarValue, ScalarUDF, Volatility};
use datafusion::prelude::{DataFrame, SessionContext};

use promoflow_core::calendar::{days_since_epoch, week_start_date};
use promoflow_core::columns::quote_ident;

use crate::dataset::Dataset;
use crate::error::PipelineError;

/// SQL name of the week-start scalar function.
pub const WEEK_START_FN: &str = "week_start_date";

pub struct EngineSession {
    app_name: String,
    ctx: SessionContext,
    views: Mutex<BTreeSet<String>>,
}

impl EngineSession {
    /// Create the session and register the custom functions.
    pub fn start(app_name: &str) -> Self {
        let ctx = SessionContext::new();
        ctx.register_udf(week_start_udf());
        tracing::info!(app_name, "Engine session created successfully");
        Self {
            app_name: app_name.to_string(),
            ctx,
            views: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    /// Expose `dataset` to SQL under `name`, replacing any view with that name.
    pub fn register_view(&self, name: &str, dataset: &Dataset) -> Result<(), PipelineError> {
        self.ctx
            .register_table(TableReference::bare(name), dataset.frame().clone().into_view())?;
        self.lock_views().insert(name.to_string());
        Ok(())
    }

    pub fn deregister_view(&self, name: &str) -> Result<(), PipelineError> {
        self.ctx.deregister_table(TableReference::bare(name))?;
        self.lock_views().remove(name);
        Ok(())
    }

    /// Names of the views currently registered by this session.
    pub fn views(&self) -> Vec<String> {
        self.lock_views().iter().cloned().collect()
    }

    pub async fn sql(&self, query: &str) -> Result<DataFrame, PipelineError> {
        Ok(self.ctx.sql(query).await?)
    }

    /// `SELECT COUNT(*) FROM view WHERE predicate`.
    pub async fn count_where(&self, view: &str, predicate: &str) -> Result<u64, PipelineError> {
        let query = format!(
            "SELECT COUNT(*) FROM {} WHERE {predicate}",
            quote_ident(view)
        );
        let values = self.first_row_as_i64(&query).await?;
        Ok(values.first().copied().flatten().unwrap_or(0).max(0) as u64)
    }

    /// Run `query` and return its first row with every column cast to BIGINT.
    ///
    /// An empty result yields one `None` per column.
    pub async fn first_row_as_i64(&self, query: &str) -> Result<Vec<Option<i64>>, PipelineError> {
        let frame = self.sql(query).await?;
        let width = frame.schema().fields().len();
        let batches = frame.collect().await?;
        let Some(batch) = batches.iter().find(|b| b.num_rows() > 0) else {
            return Ok(vec![None; width]);
        };
        batch
            .columns()
            .iter()
            .map(|column| -> Result<Option<i64>, PipelineError> {
                let column = cast(column, &DataType::Int64)?;
                let ints = as_int64_array(column.as_ref())?;
                Ok(if ints.is_null(0) { None } else { Some(ints.value(0)) })
            })
            .collect()
    }

    /// Deregister every view and release the session.
    pub fn stop(self) {
        for view in self.views() {
            if let Err(e) = self.deregister_view(&view) {
                tracing::warn!(view = %view, error = %e, "Failed to deregister view");
            }
        }
        tracing::info!(app_name = %self.app_name, "Engine session stopped");
    }

    fn lock_views(&self) -> std::sync::MutexGuard<'_, BTreeSet<String>> {
        self.views.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// `week_start_date(year BIGINT, week BIGINT) -> DATE`.
fn week_start_udf() -> ScalarUDF {
    create_udf(
        WEEK_START_FN,
        vec![DataType::Int64, DataType::Int64],
        DataType::Date32,
        Volatility::Immutable,
        Arc::new(week_start_kernel),
    )
}

fn week_start_kernel(args: &[ColumnarValue]) -> datafusion::error::Result<ColumnarValue> {
    let arrays = ColumnarValue::values_to_arrays(args)?;
    let years = as_int64_array(arrays[0].as_ref())?;
    let weeks = as_int64_array(arrays[1].as_ref())?;

    let dates: Date32Array = years
        .iter()
        .zip(weeks.iter())
        .map(|(year, week)| {
            let date = week_start_date(year?, week?)?;
            Some(days_since_epoch(date))
        })
        .collect();

    Ok(ColumnarValue::Array(Arc::new(dates) as ArrayRef))
}
