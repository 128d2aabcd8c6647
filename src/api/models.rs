use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::draws::models::{DrawId, GameType, PrizeTableEntry};
use crate::reconciliation::{RangeReport, WeeklyReport};

// ========== REQUEST MODELS ==========

#[derive(Debug, Deserialize)]
pub struct ReconcileWeekQuery {
    /// Defaults to the configured AUTO_UPDATE
    pub auto_update: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ReconcileRangeQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub auto_update: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct PrizeTableQuery {
    /// Draw numbers restart yearly; defaults to the current year
    pub year: Option<i32>,
}

// ========== RESPONSE MODELS ==========

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub store: String,
    pub timestamp: DateTime<Utc>,
}

/// Weekly report plus its rendered text
#[derive(Debug, Serialize)]
pub struct WeekResponse {
    pub report: WeeklyReport,
    pub summary: String,
}

#[derive(Debug, Serialize)]
pub struct RangeResponse {
    pub report: RangeReport,
    pub summary: String,
}

#[derive(Debug, Serialize)]
pub struct PrizeTableResponse {
    pub game: GameType,
    pub draw_id: DrawId,
    pub entries: Vec<PrizeTableEntry>,
}
