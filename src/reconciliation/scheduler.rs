// Reconciliation Scheduler - runs the current week once a day
//
// Executes at the configured local hour, after the day's draws are
// normally published. Failures are logged and the loop waits for the
// next day; it never stops the service.

use chrono::{Duration as ChronoDuration, NaiveDateTime};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{error, info};

use super::calendar::{monday_of, Clock};
use super::orchestrator::WeeklyReconciler;

#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// Local hour to run the reconciliation (0-23)
    pub execution_hour: u32,
    pub auto_update: bool,
}

pub struct ReconciliationScheduler {
    config: ScheduleConfig,
    reconciler: Arc<WeeklyReconciler>,
    clock: Arc<dyn Clock>,
}

impl ReconciliationScheduler {
    pub fn new(config: ScheduleConfig, reconciler: Arc<WeeklyReconciler>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            reconciler,
            clock,
        }
    }

    /// Start the scheduler (runs in background)
    pub fn start(&self) -> JoinHandle<()> {
        let config = self.config.clone();
        let reconciler = self.reconciler.clone();
        let clock = self.clock.clone();

        tokio::spawn(async move { Self::run_daily_scheduler(&config, &reconciler, clock.as_ref()).await })
    }

    async fn run_daily_scheduler(config: &ScheduleConfig, reconciler: &Arc<WeeklyReconciler>, clock: &dyn Clock) {
        loop {
            let now = clock.now();
            let next_execution = Self::calculate_next_daily_execution(now, config.execution_hour);
            let wait = next_execution.signed_duration_since(now);

            if wait.num_seconds() > 0 {
                info!("⏰ Next reconciliation scheduled for: {}", next_execution.format("%Y-%m-%d %H:%M"));
                tokio::time::sleep(Duration::from_secs(wait.num_seconds() as u64)).await;
            }

            let monday = monday_of(clock.today());
            info!("🔄 Starting daily reconciliation for week {}", monday);

            match reconciler.reconcile_week(monday, config.auto_update).await {
                Ok(report) => info!(
                    "✓ Daily reconciliation completed: {} winning tickets, {}, {} pending",
                    report.winners(),
                    report.total,
                    report.pending.len()
                ),
                Err(e) => error!("❌ Daily reconciliation failed: {:?}", e),
            }

            // Never run twice within the same minute
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
    }

    /// Next occurrence of `execution_hour:00`, strictly after `now`
    fn calculate_next_daily_execution(now: NaiveDateTime, execution_hour: u32) -> NaiveDateTime {
        let hour = execution_hour.min(23);
        let today = now.date().and_hms_opt(hour, 0, 0).unwrap_or(now);

        if today <= now {
            today + ChronoDuration::days(1)
        } else {
            today
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, NaiveDate, Timelike};

    use super::*;

    #[test]
    fn test_calculate_next_daily_execution() {
        let now = NaiveDate::from_ymd_opt(2025, 1, 6)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();

        // Later today
        let next = ReconciliationScheduler::calculate_next_daily_execution(now, 23);
        assert_eq!(next.hour(), 23);
        assert_eq!(next.day(), 6);

        // Already passed, so tomorrow
        let next = ReconciliationScheduler::calculate_next_daily_execution(now, 9);
        assert_eq!(next.hour(), 9);
        assert_eq!(next.day(), 7);

        // Exactly now runs tomorrow
        let next = ReconciliationScheduler::calculate_next_daily_execution(now, 10);
        assert_eq!(next.day(), 7);
    }
}
