//! Repository for the promotion reporting table.

use sqlx::{PgConnection, PgPool};

use promoflow_core::{PromotionRecord, WriteMode};

use crate::models::promotion::PromotionRow;
use crate::table::TableName;

/// Column list shared by INSERT and SELECT statements.
const COLUMNS: &str = "\
    year, week_number, product, price, discount, discount_percent, \
    final_unit_price, units, sales_dollars, gross_margin_dollars, \
    gross_margin_percent, on_flyer_flag, high_discount_flag, \
    sales_category, week_start_date";

/// Number of bound parameters per row; must match [`COLUMNS`].
const COLUMN_COUNT: usize = 15;

/// Rows per multi-row INSERT, well under Postgres' 65535 bind limit.
const INSERT_CHUNK_ROWS: usize = 1000;

/// Provides write and read operations for the promotion table.
pub struct PromotionRepo;

impl PromotionRepo {
    /// Create the table if it does not exist yet.
    pub async fn ensure_table(conn: &mut PgConnection, table: &TableName) -> Result<(), sqlx::Error> {
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {table} (\
                year BIGINT, \
                week_number BIGINT, \
                product TEXT, \
                price DOUBLE PRECISION, \
                discount DOUBLE PRECISION, \
                discount_percent DOUBLE PRECISION, \
                final_unit_price DOUBLE PRECISION, \
                units BIGINT, \
                sales_dollars DOUBLE PRECISION, \
                gross_margin_dollars DOUBLE PRECISION, \
                gross_margin_percent DOUBLE PRECISION, \
                on_flyer_flag BIGINT, \
                high_discount_flag BIGINT, \
                sales_category TEXT, \
                week_start_date DATE\
            )"
        );
        sqlx::query(&ddl).execute(conn).await?;
        Ok(())
    }

    /// Remove every row from the table.
    pub async fn truncate(conn: &mut PgConnection, table: &TableName) -> Result<(), sqlx::Error> {
        sqlx::query(&format!("TRUNCATE TABLE {table}"))
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Insert records using multi-row INSERT statements.
    ///
    /// Returns the number of rows inserted.
    pub async fn insert_batch(
        conn: &mut PgConnection,
        table: &TableName,
        records: &[PromotionRecord],
    ) -> Result<u64, sqlx::Error> {
        let mut inserted = 0u64;
        for chunk in records.chunks(INSERT_CHUNK_ROWS) {
            let query = insert_statement(table, chunk.len());
            let mut q = sqlx::query(&query);
            for r in chunk {
                q = q
                    .bind(r.year)
                    .bind(r.week_number)
                    .bind(r.product.as_deref())
                    .bind(r.price)
                    .bind(r.discount)
                    .bind(r.discount_percent)
                    .bind(r.final_unit_price)
                    .bind(r.units)
                    .bind(r.sales_dollars)
                    .bind(r.gross_margin_dollars)
                    .bind(r.gross_margin_percent)
                    .bind(r.on_flyer_flag)
                    .bind(r.high_discount_flag)
                    .bind(r.sales_category.map(|c| c.as_str()))
                    .bind(r.week_start_date);
            }
            inserted += q.execute(&mut *conn).await?.rows_affected();
        }
        Ok(inserted)
    }

    /// Write `records` in one transaction, replacing prior contents when
    /// `mode` is [`WriteMode::Overwrite`].
    pub async fn write_all(
        pool: &PgPool,
        table: &TableName,
        records: &[PromotionRecord],
        mode: WriteMode,
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        Self::ensure_table(&mut *tx, table).await?;
        if mode == WriteMode::Overwrite {
            Self::truncate(&mut *tx, table).await?;
        }
        let inserted = Self::insert_batch(&mut *tx, table, records).await?;
        tx.commit().await?;
        Ok(inserted)
    }

    /// Count rows currently stored.
    pub async fn count(pool: &PgPool, table: &TableName) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// Fetch all rows ordered by year, week and product.
    pub async fn list(pool: &PgPool, table: &TableName) -> Result<Vec<PromotionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {table} ORDER BY year, week_number, product"
        );
        sqlx::query_as::<_, PromotionRow>(&query)
            .fetch_all(pool)
            .await
    }
}

/// Build `INSERT INTO t (...) VALUES ($1, ..), (..)` for `rows` rows.
fn insert_statement(table: &TableName, rows: usize) -> String {
    let mut query = format!("INSERT INTO {table} ({COLUMNS}) VALUES ");
    let mut param_idx = 1usize;
    for i in 0..rows {
        if i > 0 {
            query.push_str(", ");
        }
        query.push('(');
        for j in 0..COLUMN_COUNT {
            if j > 0 {
                query.push_str(", ");
            }
            query.push('$');
            query.push_str(&param_idx.to_string());
            param_idx += 1;
        }
        query.push(')');
    }
    query
}
