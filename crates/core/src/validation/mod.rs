//! Data-quality rule vocabulary.
//!
//! The checks themselves run inside the query engine; this module only
//! describes them: which rules exist, their bounds and severities, and the
//! findings they produce.

pub mod rules;

pub use rules::{
    Finding, Rule, Severity, ValidationReport, DEFAULT_SALES_TOLERANCE, DISCOUNT_RANGE,
    WEEK_RANGE, YEAR_RANGE,
};
