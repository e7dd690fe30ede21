//! Run status report.

use std::path::PathBuf;

use uuid::Uuid;

/// Outcome of one pipeline run, as handed to a notifier.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub app_name: String,
    pub run_id: Uuid,
    pub success: bool,
    pub log_file: PathBuf,
    /// Structured run summary rendered into the message body.
    pub details: Option<serde_json::Value>,
}

impl StatusReport {
    pub fn status_label(&self) -> &'static str {
        if self.success {
            "SUCCESS"
        } else {
            "FAILURE"
        }
    }

    pub fn subject(&self) -> String {
        format!("{} Status: {}", self.app_name, self.status_label())
    }

    pub fn body(&self) -> String {
        let mut body = format!(
            "The {} completed with status: {}.\nRun: {}\n\nPlease see the attached log file for details.",
            self.app_name,
            self.status_label(),
            self.run_id,
        );
        if let Some(details) = &self.details {
            body.push_str("\n\nSummary:\n");
            body.push_str(&serde_json::to_string_pretty(details).unwrap_or_default());
        }
        body
    }

    /// File name used for the attachment.
    pub fn log_file_name(&self) -> String {
        self.log_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "run.log".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(success: bool) -> StatusReport {
        StatusReport {
            app_name: "PromotionPipeline".into(),
            run_id: Uuid::nil(),
            success,
            log_file: PathBuf::from("logs/promotionpipeline_20240101_120000.log"),
            details: None,
        }
    }

    #[test]
    fn subject_carries_status() {
        assert_eq!(report(true).subject(), "PromotionPipeline Status: SUCCESS");
        assert_eq!(report(false).subject(), "PromotionPipeline Status: FAILURE");
    }

    #[test]
    fn body_includes_summary_when_present() {
        let mut r = report(true);
        assert!(!r.body().contains("Summary"));

        r.details = Some(serde_json::json!({ "rows_written": 6 }));
        let body = r.body();
        assert!(body.contains("completed with status: SUCCESS"));
        assert!(body.contains("\"rows_written\": 6"));
    }

    #[test]
    fn attachment_name_is_the_log_file_name() {
        assert_eq!(report(true).log_file_name(), "promotionpipeline_20240101_120000.log");
    }
}
