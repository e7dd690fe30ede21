//! `promoflow-worker` -- one-shot promotion ETL run.
//!
//! Reads the run configuration, converts and loads both promotion
//! workbooks, validates and transforms them, writes the combined table and
//! emails the run status with the log attached.
//!
//! The config file is `config.env` in the working directory unless
//! `PROMOFLOW_CONFIG` names another one. See `promoflow_core::config` for
//! the keys it accepts.
//!
//! Exits non-zero only when the configuration or logging cannot be set up.
//! A failed run is reported through the log and the status email.

use anyhow::Context;

use promoflow_core::RunConfig;
use promoflow_db::PgRecordSink;
use promoflow_events::EmailDelivery;
use promoflow_pipeline::{Pipeline, RunLog};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = RunConfig::default_path();
    let config = RunConfig::from_file(&config_path)
        .with_context(|| format!("loading configuration from {}", config_path.display()))?;

    let log = RunLog::init(&config.app_name, &config.paths.log_dir)
        .context("initializing run logging")?;

    let sink = PgRecordSink::new(config.database.clone());
    let notifier = EmailDelivery::new(config.email.clone());

    let outcome = Pipeline::new(&config, &sink, &notifier).run(&log).await;
    tracing::info!(
        success = outcome.success,
        notified = outcome.notification.is_sent(),
        notification = ?outcome.notification,
        log_file = %outcome.log_file.display(),
        "Run finished",
    );
    Ok(())
}
