//! Run status notification.
//!
//! - [`StatusReport`] -- what happened in one run and where its log lives.
//! - [`StatusNotifier`] -- delivery seam; implementations never fail the run.
//! - [`EmailDelivery`] -- SMTP delivery with the log file attached.

pub mod delivery;
pub mod report;

pub use delivery::email::{EmailDelivery, EmailError};
pub use delivery::{NotifyOutcome, StatusNotifier};
pub use report::StatusReport;
