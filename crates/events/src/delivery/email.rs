//! Status notification delivery via SMTP.
//!
//! [`EmailDelivery`] wraps the `lettre` async SMTP transport to send a
//! plain-text status message with the run's log file attached. Delivery
//! is skipped when a credential is blank, and every failure is logged and
//! reported as [`NotifyOutcome::Failed`] instead of being propagated.

use std::path::Path;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use promoflow_core::config::EmailConfig;

use super::{NotifyOutcome, StatusNotifier};
use crate::report::StatusReport;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The log file exists but could not be read.
    #[error("Attachment read error: {0}")]
    Attachment(#[from] std::io::Error),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// EmailDelivery
// ---------------------------------------------------------------------------

/// Sends run status emails via an authenticated STARTTLS SMTP connection.
pub struct EmailDelivery {
    config: EmailConfig,
}

impl EmailDelivery {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Assemble the status message, attaching `log` when given.
    pub fn compose(
        &self,
        report: &StatusReport,
        log: Option<Vec<u8>>,
    ) -> Result<Message, EmailError> {
        let from: Mailbox = self.config.user.parse()?;
        let to: Mailbox = self.config.to.parse()?;

        let mut parts = MultiPart::mixed().singlepart(SinglePart::plain(report.body()));
        if let Some(bytes) = log {
            parts = parts.singlepart(
                Attachment::new(report.log_file_name()).body(bytes, ContentType::TEXT_PLAIN),
            );
        }

        Message::builder()
            .from(from)
            .to(to)
            .subject(report.subject())
            .multipart(parts)
            .map_err(|e| EmailError::Build(e.to_string()))
    }

    /// Compose and send; any failure is returned to the caller.
    pub async fn deliver(&self, report: &StatusReport) -> Result<(), EmailError> {
        let log = read_log(&report.log_file).await?;
        if log.is_some() {
            tracing::info!(log_file = %report.log_file.display(), "Attached log file");
        }
        let email = self.compose(report, log)?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
            .port(self.config.smtp_port)
            .credentials(Credentials::new(
                self.config.user.clone(),
                self.config.password.clone(),
            ))
            .build();
        mailer.send(email).await?;

        tracing::info!(to = %self.config.to, status = report.status_label(), "Status email sent successfully");
        Ok(())
    }
}

#[async_trait]
impl StatusNotifier for EmailDelivery {
    async fn notify(&self, report: &StatusReport) -> NotifyOutcome {
        if let Some(missing) = self.config.missing_credential() {
            tracing::warn!(
                missing,
                "Email configuration is incomplete. Skipping email notification",
            );
            return NotifyOutcome::Skipped {
                reason: format!("email {missing} is not configured"),
            };
        }

        match self.deliver(report).await {
            Ok(()) => NotifyOutcome::Sent,
            Err(e) => {
                tracing::error!(error = ?e, "Failed to send status email");
                NotifyOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}

/// Read the log file if it exists; a missing file is not an error.
async fn read_log(path: &Path) -> Result<Option<Vec<u8>>, std::io::Error> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
