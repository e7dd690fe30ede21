//! Declarative transform of a raw promotion dataset.
//!
//! Two views are registered per dataset: `<view>_raw` with the source
//! headers and `<view>` with identifier-safe names. The transform query
//! then derives the reporting columns from the normalized view.

use promoflow_core::columns::{derived as d, normalize_column_name, quote_ident};
use promoflow_core::types::{HIGH_DISCOUNT_THRESHOLD, HIGH_VOLUME_UNITS, MEDIUM_VOLUME_UNITS};
use promoflow_core::SalesCategory;

use crate::dataset::Dataset;
use crate::engine::{EngineSession, WEEK_START_FN};
use crate::error::PipelineError;

/// Derive the reporting columns from `dataset`.
///
/// `view_name` must be unique within the session; it names both the
/// registered view and the returned dataset.
pub async fn transform(
    session: &EngineSession,
    dataset: &Dataset,
    view_name: &str,
) -> Result<Dataset, PipelineError> {
    let result = run(session, dataset, view_name).await;
    if let Err(e) = &result {
        tracing::error!(view = view_name, error = ?e, "Transformation failed");
    }
    result
}

async fn run(
    session: &EngineSession,
    dataset: &Dataset,
    view_name: &str,
) -> Result<Dataset, PipelineError> {
    let raw_view = format!("{view_name}_raw");
    session.register_view(&raw_view, dataset)?;

    let normalized = session
        .sql(&rename_query(&raw_view, &dataset.column_names()))
        .await?;
    session.register_view(view_name, &Dataset::new(view_name, normalized))?;
    tracing::info!(view = view_name, "Temporary SQL view created");

    let frame = session.sql(&transform_query(view_name)).await?;
    tracing::info!(view = view_name, "Transformation query executed successfully");
    Ok(Dataset::new(view_name, frame))
}

/// `SELECT "Sales $" AS "Sales_dollars", ... FROM <view>`.
fn rename_query(view: &str, columns: &[String]) -> String {
    let projections: Vec<String> = columns
        .iter()
        .map(|c| format!("{} AS {}", quote_ident(c), quote_ident(&normalize_column_name(c))))
        .collect();
    format!("SELECT {} FROM {}", projections.join(", "), quote_ident(view))
}

// Float equality is a total order, so -0.0 = 0 is false; ABS folds it to 0.0.
fn transform_query(view: &str) -> String {
    let q = quote_ident;
    format!(
        "SELECT \
            {year}, \
            {week}, \
            UPPER(TRIM({product})) AS {product}, \
            {price}, \
            {discount}, \
            ROUND({discount} * 100, 2) AS {discount_pct}, \
            ROUND({price} * (1 - {discount}), 2) AS {final_price}, \
            {units}, \
            {sales}, \
            {margin}, \
            CASE \
                WHEN ABS({sales}) = 0 THEN NULL \
                ELSE ROUND({margin} / {sales} * 100, 2) \
            END AS {margin_pct}, \
            CASE WHEN {on_flyer} = 'Yes' THEN 1 ELSE 0 END AS {flyer_flag}, \
            CASE WHEN {discount} > {high_discount} THEN 1 ELSE 0 END AS {high_discount_flag}, \
            CASE \
                WHEN {units} >= {high_units} THEN '{high}' \
                WHEN {units} >= {medium_units} THEN '{medium}' \
                ELSE '{low}' \
            END AS {category}, \
            {week_fn}({year}, {week}) AS {week_start} \
        FROM (\
            SELECT \
                CAST({year} AS BIGINT) AS {year}, \
                CAST({week} AS BIGINT) AS {week}, \
                CAST({product} AS VARCHAR) AS {product}, \
                CAST({price} AS DOUBLE) AS {price}, \
                CAST({discount} AS DOUBLE) AS {discount}, \
                CAST({units} AS BIGINT) AS {units}, \
                CAST({sales} AS DOUBLE) AS {sales}, \
                CAST({margin} AS DOUBLE) AS {margin}, \
                CAST({on_flyer} AS VARCHAR) AS {on_flyer} \
            FROM {view}\
        ) AS typed",
        year = q(d::YEAR),
        week = q(d::WEEK_NUMBER),
        product = q(d::PRODUCT),
        price = q(d::PRICE),
        discount = q(d::DISCOUNT),
        discount_pct = q(d::DISCOUNT_PERCENT),
        final_price = q(d::FINAL_UNIT_PRICE),
        units = q(d::UNITS),
        sales = q(d::SALES),
        margin = q(d::GROSS_MARGIN),
        margin_pct = q(d::GROSS_MARGIN_PERCENT),
        on_flyer = q(d::ON_FLYER),
        flyer_flag = q(d::ON_FLYER_FLAG),
        high_discount = HIGH_DISCOUNT_THRESHOLD,
        high_discount_flag = q(d::HIGH_DISCOUNT_FLAG),
        high_units = HIGH_VOLUME_UNITS,
        medium_units = MEDIUM_VOLUME_UNITS,
        high = SalesCategory::High,
        medium = SalesCategory::Medium,
        low = SalesCategory::Low,
        category = q(d::SALES_CATEGORY),
        week_fn = WEEK_START_FN,
        week_start = q(d::WEEK_START_DATE),
        view = q(view),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rename_query_quotes_both_sides() {
        let sql = rename_query("promo_raw", &["Sales $".to_string(), "On Flyer?".to_string()]);
        assert_eq!(
            sql,
            "SELECT \"Sales $\" AS \"Sales_dollars\", \"On Flyer?\" AS \"On_Flyer\" FROM \"promo_raw\""
        );
    }

    #[test]
    fn transform_query_guards_margin_division() {
        let sql = transform_query("promo");
        assert!(sql.contains("WHEN ABS(\"Sales_dollars\") = 0 THEN NULL"));
        assert!(sql.contains("week_start_date(\"Year\", \"week_number\")"));
        assert!(sql.contains("FROM \"promo\""));
    }
}
