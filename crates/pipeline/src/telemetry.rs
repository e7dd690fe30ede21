//! Run logging: console plus a per-run log file.
//!
//! The log file is what the status email attaches, so it is written
//! synchronously; every line is on disk by the time the notifier reads it.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::error::PipelineError;

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str =
    "promoflow_pipeline=info,promoflow_db=info,promoflow_events=info,promoflow_worker=info,warn";

/// Identity and log destination of one run.
#[derive(Debug, Clone)]
pub struct RunLog {
    run_id: Uuid,
    path: PathBuf,
}

impl RunLog {
    /// Create `log_dir`, open `<app>_<timestamp>.log` in it and install the
    /// global subscriber.
    ///
    /// Fails if a global subscriber is already installed.
    pub fn init(app_name: &str, log_dir: &Path) -> Result<Self, PipelineError> {
        std::fs::create_dir_all(log_dir)?;
        let file_name = log_file_name(app_name, Local::now());
        let stem = file_name.trim_end_matches(".log").to_string();

        let appender = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(stem)
            .filename_suffix("log")
            .build(log_dir)
            .map_err(|e| PipelineError::Logging(e.to_string()))?;

        tracing_subscriber::registry()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
            .with(tracing_subscriber::fmt::layer())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(appender),
            )
            .try_init()
            .map_err(|e| PipelineError::Logging(e.to_string()))?;

        let run_log = Self {
            run_id: Uuid::now_v7(),
            path: log_dir.join(file_name),
        };
        tracing::info!(
            run_id = %run_log.run_id,
            path = %run_log.path.display(),
            "Logging initialized",
        );
        Ok(run_log)
    }

    /// A run identity for an already-configured subscriber (or none).
    pub fn detached(path: impl Into<PathBuf>) -> Self {
        Self {
            run_id: Uuid::now_v7(),
            path: path.into(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// `<app name lowercased>_<YYYYmmdd_HHMMSS>.log`.
pub fn log_file_name(app_name: &str, at: DateTime<Local>) -> String {
    format!(
        "{}_{}.log",
        app_name.to_lowercase(),
        at.format("%Y%m%d_%H%M%S")
    )
}
