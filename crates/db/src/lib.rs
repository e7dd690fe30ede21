//! Relational sink for the combined promotion dataset.

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use promoflow_core::config::DatabaseConfig;

pub mod models;
pub mod repositories;
pub mod sink;
pub mod table;

pub use sink::{PgRecordSink, RecordSink, SinkError};
pub use table::TableName;

pub type DbPool = sqlx::PgPool;

/// The sink holds at most one transaction at a time.
const MAX_CONNECTIONS: u32 = 2;

/// Create a connection pool from the sink configuration.
///
/// Credentials are applied on top of the URL, so the URL itself may omit
/// them.
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    let options: PgConnectOptions = config.url.parse()?;
    let options = options.username(&config.user).password(&config.password);
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(options)
        .await
}

/// Round-trip a trivial query to prove the connection is usable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
