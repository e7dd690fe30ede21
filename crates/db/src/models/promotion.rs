//! Promotion table row model.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

/// A row as stored in the promotion table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PromotionRow {
    pub year: Option<i64>,
    pub week_number: Option<i64>,
    pub product: Option<String>,
    pub price: Option<f64>,
    pub discount: Option<f64>,
    pub discount_percent: Option<f64>,
    pub final_unit_price: Option<f64>,
    pub units: Option<i64>,
    pub sales_dollars: Option<f64>,
    pub gross_margin_dollars: Option<f64>,
    pub gross_margin_percent: Option<f64>,
    pub on_flyer_flag: Option<i64>,
    pub high_discount_flag: Option<i64>,
    pub sales_category: Option<String>,
    pub week_start_date: Option<NaiveDate>,
}
