//! Sink writer: persists the combined dataset to the relational table.

use async_trait::async_trait;

use promoflow_core::config::DatabaseConfig;
use promoflow_core::{CoreError, PromotionRecord, WriteMode};

use crate::repositories::PromotionRepo;
use crate::DbPool;
use crate::table::TableName;

/// Error type for sink failures.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The configured table name is not a safe identifier.
    #[error("Invalid sink configuration: {0}")]
    Config(#[from] CoreError),

    /// Connecting to the database failed.
    #[error("Database connection failed: {0}")]
    Connect(#[source] sqlx::Error),

    /// A statement inside the write transaction failed.
    #[error("Database write failed: {0}")]
    Write(#[source] sqlx::Error),
}

/// Destination for the combined promotion dataset.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Persist `records`, returning the number of rows written.
    async fn write(&self, records: &[PromotionRecord]) -> Result<u64, SinkError>;
}

/// Postgres-backed [`RecordSink`].
///
/// Connects lazily on each write so a run that fails before the sink stage
/// never opens a connection.
pub struct PgRecordSink {
    config: DatabaseConfig,
}

impl PgRecordSink {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl RecordSink for PgRecordSink {
    async fn write(&self, records: &[PromotionRecord]) -> Result<u64, SinkError> {
        let table = TableName::parse(&self.config.table)?;
        tracing::info!(
            rows = records.len(),
            table = %table,
            mode = %self.config.write_mode,
            "Writing rows to database table",
        );

        let pool = crate::create_pool(&self.config)
            .await
            .map_err(SinkError::Connect)?;
        let written = write_and_close(pool, &table, records, self.config.write_mode).await?;

        tracing::info!(rows = written, table = %table, "Successfully wrote data to database");
        Ok(written)
    }
}

/// Check the connection, write, then close the pool whatever the result.
async fn write_and_close(
    pool: DbPool,
    table: &TableName,
    records: &[PromotionRecord],
    mode: WriteMode,
) -> Result<u64, SinkError> {
    let result = match crate::health_check(&pool).await {
        Ok(()) => PromotionRepo::write_all(&pool, table, records, mode)
            .await
            .map_err(SinkError::Write),
        Err(e) => Err(SinkError::Connect(e)),
    };
    pool.close().await;
    result
}
