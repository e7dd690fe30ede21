//! Orchestration of one pipeline run.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use promoflow_core::validation::ValidationReport;
use promoflow_core::RunConfig;
use promoflow_db::RecordSink;
use promoflow_events::{NotifyOutcome, StatusNotifier, StatusReport};

use crate::combine::combine;
use crate::convert::convert_workbook;
use crate::dataset::Dataset;
use crate::engine::EngineSession;
use crate::error::PipelineError;
use crate::load::load_csv;
use crate::records::to_records;
use crate::telemetry::RunLog;
use crate::transform::transform;
use crate::validate::validate;

/// View name of the transformed historical dataset.
pub const OLD_VIEW: &str = "promotion_data_old";

/// View name of the transformed recent dataset.
pub const NEW_VIEW: &str = "promotion_data_new";

/// Rows of the combined dataset echoed to the log.
pub const PREVIEW_ROWS: usize = 10;

// ---------------------------------------------------------------------------
// Summary types
// ---------------------------------------------------------------------------

/// Per-input figures gathered before the transform.
#[derive(Debug, Clone, Serialize)]
pub struct InputSummary {
    pub label: String,
    pub rows: usize,
    pub columns: usize,
    pub report: ValidationReport,
}

/// Everything the run learned, rendered into the status email.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub inputs: Vec<InputSummary>,
    pub combined_rows: Option<usize>,
    pub rows_written: Option<u64>,
    /// Display form of the error that aborted the run, if any.
    pub error: Option<String>,
}

impl RunSummary {
    fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            inputs: Vec::new(),
            combined_rows: None,
            rows_written: None,
            error: None,
        }
    }

    /// Validation findings of the input labelled `label`.
    pub fn report_for(&self, label: &str) -> Option<&ValidationReport> {
        self.inputs
            .iter()
            .find(|input| input.label == label)
            .map(|input| &input.report)
    }
}

/// Result of [`Pipeline::run`].
#[derive(Debug)]
pub struct RunOutcome {
    pub success: bool,
    pub log_file: PathBuf,
    pub summary: RunSummary,
    pub notification: NotifyOutcome,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Runs the stages against a sink and reports through a notifier.
pub struct Pipeline<'a> {
    config: &'a RunConfig,
    sink: &'a dyn RecordSink,
    notifier: &'a dyn StatusNotifier,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a RunConfig,
        sink: &'a dyn RecordSink,
        notifier: &'a dyn StatusNotifier,
    ) -> Self {
        Self {
            config,
            sink,
            notifier,
        }
    }

    /// Execute every stage, then notify and tear down the engine session.
    ///
    /// Stage failures never escape: they end the run early, are logged, and
    /// show up as `success == false` in the outcome and the notification.
    pub async fn run(&self, log: &RunLog) -> RunOutcome {
        let span = tracing::info_span!("run", run_id = %log.run_id());
        self.run_in_span(log).instrument(span).await
    }

    async fn run_in_span(&self, log: &RunLog) -> RunOutcome {
        tracing::info!(app_name = %self.config.app_name, "Pipeline started");
        let mut summary = RunSummary::new(log.run_id());
        let mut engine: Option<EngineSession> = None;

        let success = match self.execute(&mut engine, &mut summary).await {
            Ok(()) => {
                tracing::info!("Pipeline completed successfully");
                true
            }
            Err(e) => {
                tracing::error!(error = ?e, "Pipeline failed");
                summary.error = Some(e.to_string());
                false
            }
        };

        let notification = self.notify(log, success, &summary).await;

        if let Some(session) = engine {
            session.stop();
        }

        RunOutcome {
            success,
            log_file: log.path().to_path_buf(),
            summary,
            notification,
        }
    }

    async fn execute(
        &self,
        engine: &mut Option<EngineSession>,
        summary: &mut RunSummary,
    ) -> Result<(), PipelineError> {
        let paths = &self.config.paths;
        let csv_dir = paths.csv_dir();
        let old_csv = convert_workbook(&paths.old_workbook_path(), &csv_dir)?;
        let new_csv = convert_workbook(&paths.new_workbook_path(), &csv_dir)?;

        let session = engine.insert(EngineSession::start(&self.config.app_name));

        let old = self.ingest(session, &old_csv, summary).await?;
        let new = self.ingest(session, &new_csv, summary).await?;

        let old = transform(session, &old, OLD_VIEW).await?;
        let new = transform(session, &new, NEW_VIEW).await?;
        let combined = combine(&old, &new)?;

        let rows = combined.row_count().await?;
        summary.combined_rows = Some(rows);
        tracing::info!(rows, "Total rows in combined dataset");
        match combined.preview(PREVIEW_ROWS).await {
            Ok(table) => tracing::info!("Combined dataset preview:\n{table}"),
            Err(e) => tracing::warn!(error = %e, "Could not render dataset preview"),
        }

        let records = to_records(&combined.collect().await?)?;
        let written = self.sink.write(&records).await.map_err(|e| {
            tracing::error!(error = ?e, "Failed to write to database");
            e
        })?;
        summary.rows_written = Some(written);
        tracing::info!(rows = written, "Data successfully written to database table");
        Ok(())
    }

    /// Load one CSV and run the advisory checks on it.
    async fn ingest(
        &self,
        session: &EngineSession,
        csv: &Path,
        summary: &mut RunSummary,
    ) -> Result<Dataset, PipelineError> {
        let dataset = load_csv(session, csv).await?;
        let report = validate(session, &dataset, dataset.name(), &self.config.validation).await;
        summary.inputs.push(InputSummary {
            label: dataset.name().to_string(),
            rows: dataset.row_count().await?,
            columns: dataset.column_count(),
            report,
        });
        Ok(dataset)
    }

    async fn notify(&self, log: &RunLog, success: bool, summary: &RunSummary) -> NotifyOutcome {
        let details = match serde_json::to_value(summary) {
            Ok(value) => {
                tracing::info!(summary = %value, "Run summary");
                Some(value)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not serialize run summary");
                None
            }
        };
        let report = StatusReport {
            app_name: self.config.app_name.clone(),
            run_id: log.run_id(),
            success,
            log_file: log.path().to_path_buf(),
            details,
        };
        let outcome = self.notifier.notify(&report).await;
        tracing::info!(outcome = ?outcome, "Status notification handled");
        outcome
    }
}
