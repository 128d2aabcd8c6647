// Weekly reconciliation: calendar, data backfill, ticket evaluation and reporting
pub mod calendar;
pub mod notifier;
pub mod orchestrator;
pub mod scheduler;
pub mod summary;

pub use calendar::{Clock, SystemClock};
pub use notifier::{LogNotifier, WeeklyNotifier};
pub use orchestrator::WeeklyReconciler;
pub use scheduler::{ReconciliationScheduler, ScheduleConfig};
pub use summary::{RangeReport, WeeklyReport};
