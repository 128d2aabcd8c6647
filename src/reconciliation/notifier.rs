use async_trait::async_trait;
use tracing::info;

use super::summary::WeeklyReport;
use crate::error::AppResult;

/// Receives every finished weekly report (mail, chat, ...)
#[async_trait]
pub trait WeeklyNotifier: Send + Sync {
    async fn notify(&self, report: &WeeklyReport) -> AppResult<()>;
}

/// Writes the rendered summary to the log
pub struct LogNotifier;

#[async_trait]
impl WeeklyNotifier for LogNotifier {
    async fn notify(&self, report: &WeeklyReport) -> AppResult<()> {
        info!(
            "📧 Weekly summary for {} ({} winning tickets, {}):\n{}",
            report.monday,
            report.winners(),
            report.total,
            report
        );
        Ok(())
    }
}
