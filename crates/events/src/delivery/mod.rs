//! Delivery channels for status reports.

pub mod email;

use async_trait::async_trait;

use crate::report::StatusReport;

/// What became of a notification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent,
    /// Nothing was attempted, e.g. because a credential is blank.
    Skipped { reason: String },
    /// The attempt was made and failed; already logged.
    Failed { error: String },
}

impl NotifyOutcome {
    /// True only when the report actually left the process.
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent)
    }
}

/// Sends a [`StatusReport`] somewhere.
///
/// Implementations swallow their own failures: a broken delivery path must
/// not change the outcome of the run being reported.
#[async_trait]
pub trait StatusNotifier: Send + Sync {
    async fn notify(&self, report: &StatusReport) -> NotifyOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_sent_counts_as_sent() {
        assert!(NotifyOutcome::Sent.is_sent());
        assert!(!NotifyOutcome::Skipped { reason: "no password".into() }.is_sent());
        assert!(!NotifyOutcome::Failed { error: "refused".into() }.is_sent());
    }
}
