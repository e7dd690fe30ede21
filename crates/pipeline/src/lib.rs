//! Promotion ETL workflow.
//!
//! Stages run strictly in sequence inside one [`EngineSession`]:
//! convert workbooks to CSV, load, validate, transform, combine, write to
//! the sink, and finally notify. [`Pipeline::run`] drives them and always
//! reaches the notify and session teardown steps.

pub mod combine;
pub mod convert;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod load;
pub mod records;
pub mod runner;
pub mod telemetry;
pub mod transform;
pub mod validate;

pub use dataset::Dataset;
pub use engine::EngineSession;
pub use error::PipelineError;
pub use runner::{Pipeline, RunOutcome, RunSummary};
pub use telemetry::RunLog;
