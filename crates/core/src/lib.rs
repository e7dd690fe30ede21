//! Domain building blocks for the promotion ETL job.
//!
//! Everything here is free of engine, database and mail dependencies:
//! run configuration, the raw and derived column catalog, the calendar
//! helper behind `Week_Start_Date`, the validation rule vocabulary, and
//! the record type handed to the sink.

pub mod calendar;
pub mod columns;
pub mod config;
pub mod error;
pub mod types;
pub mod validation;

pub use config::RunConfig;
pub use error::CoreError;
pub use types::{PromotionRecord, SalesCategory, WriteMode};
