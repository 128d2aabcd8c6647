// Result/prize store gateway
//
// Natural keys: results by (game, draw id), prize entries by
// (game, draw id, category code), tickets by id. Every upsert is an
// insert-or-update on that key, so repeating it never adds rows.
//
// Draw numbers restart every year, so prize lookups are scoped to the
// year of the draw date. Legacy "YYYY/NNN" ids match on their numeric suffix.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;

use crate::draws::models::{DrawId, DrawResult, GameType, PrizeTableEntry, Ticket};
use crate::error::AppResult;

pub use memory::InMemoryResultStore;
pub use postgres::PgResultStore;

#[async_trait]
pub trait ResultStore: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fails when the store cannot be reached
    async fn ping(&self) -> AppResult<()>;

    async fn has_result(&self, game: GameType, date: NaiveDate) -> AppResult<bool> {
        Ok(self.find_result_by_date(game, date).await?.is_some())
    }

    async fn find_result_by_date(&self, game: GameType, date: NaiveDate) -> AppResult<Option<DrawResult>>;

    /// Results drawn between `from` and `to` inclusive, ordered by date then draw id
    async fn results_between(&self, game: GameType, from: NaiveDate, to: NaiveDate) -> AppResult<Vec<DrawResult>>;

    /// True when entries exist for the draw id in the year of `date`
    async fn has_prize_table(&self, game: GameType, draw_id: &DrawId, date: NaiveDate) -> AppResult<bool>;

    /// Prize table of the draw id in `year`, one entry per category, best tier first
    async fn prize_table(&self, game: GameType, draw_id: &DrawId, year: i32) -> AppResult<Vec<PrizeTableEntry>>;

    /// Insert, or fill supplementary fields that were unknown
    async fn upsert_result(&self, result: &DrawResult) -> AppResult<()>;

    /// Returns the number of entries written
    async fn upsert_prize_entries(&self, entries: &[PrizeTableEntry]) -> AppResult<usize>;

    async fn upsert_ticket(&self, ticket: &Ticket) -> AppResult<()>;

    async fn tickets_for_draw(&self, game: GameType, draw_id: &DrawId) -> AppResult<Vec<Ticket>>;
}

/// Keep one entry per category, preferring the most recently drawn one
pub(crate) fn newest_per_category(entries: impl IntoIterator<Item = PrizeTableEntry>) -> Vec<PrizeTableEntry> {
    let mut by_code: HashMap<&'static str, PrizeTableEntry> = HashMap::new();
    for entry in entries {
        match by_code.get(entry.category.code()) {
            Some(kept) if kept.date >= entry.date => {}
            _ => {
                by_code.insert(entry.category.code(), entry);
            }
        }
    }

    let mut table: Vec<PrizeTableEntry> = by_code.into_values().collect();
    table.sort_by_key(|e| e.category.rank());
    table
}
