use async_trait::async_trait;
use chrono::NaiveDate;

use crate::draws::models::{DrawResult, GameType, PrizeTableEntry};
use crate::error::FetchError;

/// Source of official draw data used to backfill the store.
///
/// Each call is one fallible operation; retries belong to the implementation.
#[async_trait]
pub trait DrawFetcher: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(None)` when nothing is published for that date yet
    async fn fetch_draw_result(&self, game: GameType, date: NaiveDate) -> Result<Option<DrawResult>, FetchError>;

    /// Empty when the prize table is not published yet
    async fn fetch_prize_table(&self, game: GameType, date: NaiveDate) -> Result<Vec<PrizeTableEntry>, FetchError>;
}
