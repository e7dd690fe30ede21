//! Shared value types passed between pipeline stages.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Units at or above which a row counts as a high-volume sale.
pub const HIGH_VOLUME_UNITS: i64 = 100;

/// Units at or above which a row counts as a medium-volume sale.
pub const MEDIUM_VOLUME_UNITS: i64 = 50;

/// Discount above which a row is flagged as a high discount.
pub const HIGH_DISCOUNT_THRESHOLD: f64 = 0.5;

// ---------------------------------------------------------------------------
// Sales category
// ---------------------------------------------------------------------------

/// Three-valued sales-volume bucket derived from `Units`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SalesCategory {
    High,
    Medium,
    Low,
}

impl SalesCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for SalesCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SalesCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "High" => Ok(Self::High),
            "Medium" => Ok(Self::Medium),
            "Low" => Ok(Self::Low),
            other => Err(CoreError::Validation(format!(
                "unknown sales category '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Write mode
// ---------------------------------------------------------------------------

/// How the sink treats rows already present in the target table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Replace all existing rows.
    #[default]
    Overwrite,
    /// Keep existing rows and add the new ones.
    Append,
}

impl WriteMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overwrite => "overwrite",
            Self::Append => "append",
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WriteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "append" => Ok(Self::Append),
            other => Err(format!("expected 'overwrite' or 'append', got '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Promotion record
// ---------------------------------------------------------------------------

/// One row of the combined, transformed promotion dataset.
///
/// Every field is optional because source spreadsheets may leave any cell
/// blank; the derived columns inherit that nullability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromotionRecord {
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
    /// `None` when sales is zero.
    pub gross_margin_percent: Option<f64>,
    pub on_flyer_flag: Option<i64>,
    pub high_discount_flag: Option<i64>,
    pub sales_category: Option<SalesCategory>,
    pub week_start_date: Option<NaiveDate>,
}
