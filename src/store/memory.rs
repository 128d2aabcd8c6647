use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::{newest_per_category, ResultStore};
use crate::draws::models::{DrawId, DrawResult, GameType, PrizeTableEntry, Ticket, WinningNumbers};
use crate::draws::normalizer::draw_id_matches;
use crate::error::AppResult;

type PrizeKey = (GameType, String, &'static str);

/// Store kept in process memory, for tests and dry runs
pub struct InMemoryResultStore {
    results: RwLock<HashMap<(GameType, DrawId), DrawResult>>,
    // Keyed by the draw id text as it was written, which may be a legacy "YYYY/NNN"
    prizes: RwLock<HashMap<PrizeKey, PrizeTableEntry>>,
    tickets: RwLock<HashMap<String, Ticket>>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self {
            results: RwLock::new(HashMap::new()),
            prizes: RwLock::new(HashMap::new()),
            tickets: RwLock::new(HashMap::new()),
        }
    }

    /// Load prize entries recorded under an old compound draw id
    pub async fn import_legacy_prizes(&self, stored_draw_id: &str, entries: Vec<PrizeTableEntry>) {
        let mut prizes = self.prizes.write().await;
        for entry in entries {
            prizes.insert(
                (entry.game, stored_draw_id.to_string(), entry.category.code()),
                entry,
            );
        }
    }

    pub async fn result_count(&self) -> usize {
        self.results.read().await.len()
    }

    pub async fn prize_entry_count(&self) -> usize {
        self.prizes.read().await.len()
    }

    pub async fn ticket_count(&self) -> usize {
        self.tickets.read().await.len()
    }
}

impl Default for InMemoryResultStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy supplementary fields from `incoming` only where `stored` has none
fn fill_unknown(stored: &mut WinningNumbers, incoming: &WinningNumbers) {
    match (stored, incoming) {
        (
            WinningNumbers::SixNumber { complement, reseed, .. },
            WinningNumbers::SixNumber {
                complement: new_complement,
                reseed: new_reseed,
                ..
            },
        ) => {
            if complement.is_none() {
                *complement = new_complement.clone();
            }
            if reseed.is_none() {
                *reseed = new_reseed.clone();
            }
        }
        (
            WinningNumbers::FiveStar { bonus_code, .. },
            WinningNumbers::FiveStar {
                bonus_code: new_code, ..
            },
        ) => {
            if bonus_code.is_none() {
                *bonus_code = new_code.clone();
            }
        }
        (WinningNumbers::FiveKey { key, .. }, WinningNumbers::FiveKey { key: new_key, .. }) => {
            if key.is_none() {
                *key = new_key.clone();
            }
        }
        _ => {}
    }
}

fn belongs_to((g, id, _): &PrizeKey, entry: &PrizeTableEntry, game: GameType, draw_id: &DrawId, year: i32) -> bool {
    *g == game && entry.date.year() == year && draw_id_matches(id, draw_id.as_str())
}

#[async_trait]
impl ResultStore for InMemoryResultStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn find_result_by_date(&self, game: GameType, date: NaiveDate) -> AppResult<Option<DrawResult>> {
        let results = self.results.read().await;
        Ok(results
            .values()
            .filter(|r| r.game() == game && r.date == date)
            .min_by(|a, b| a.draw_id.cmp(&b.draw_id))
            .cloned())
    }

    async fn results_between(&self, game: GameType, from: NaiveDate, to: NaiveDate) -> AppResult<Vec<DrawResult>> {
        let results = self.results.read().await;
        let mut found: Vec<DrawResult> = results
            .values()
            .filter(|r| r.game() == game && r.date >= from && r.date <= to)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.draw_id.cmp(&b.draw_id)));
        Ok(found)
    }

    async fn has_prize_table(&self, game: GameType, draw_id: &DrawId, date: NaiveDate) -> AppResult<bool> {
        let prizes = self.prizes.read().await;
        Ok(prizes
            .iter()
            .any(|(key, e)| belongs_to(key, e, game, draw_id, date.year())))
    }

    async fn prize_table(&self, game: GameType, draw_id: &DrawId, year: i32) -> AppResult<Vec<PrizeTableEntry>> {
        let prizes = self.prizes.read().await;
        Ok(newest_per_category(
            prizes
                .iter()
                .filter(|(key, e)| belongs_to(key, e, game, draw_id, year))
                .map(|(_, e)| e.clone()),
        ))
    }

    async fn upsert_result(&self, result: &DrawResult) -> AppResult<()> {
        let mut results = self.results.write().await;
        let key = (result.game(), result.draw_id.clone());
        match results.get_mut(&key) {
            Some(stored) => fill_unknown(&mut stored.winning, &result.winning),
            None => {
                results.insert(key, result.clone());
            }
        }
        debug!("💾 Stored {} draw {} in memory", result.game(), result.draw_id);
        Ok(())
    }

    async fn upsert_prize_entries(&self, entries: &[PrizeTableEntry]) -> AppResult<usize> {
        let mut prizes = self.prizes.write().await;
        for entry in entries {
            prizes.insert(
                (entry.game, entry.draw_id.as_str().to_string(), entry.category.code()),
                entry.clone(),
            );
        }
        Ok(entries.len())
    }

    async fn upsert_ticket(&self, ticket: &Ticket) -> AppResult<()> {
        let mut tickets = self.tickets.write().await;
        tickets.insert(ticket.id.clone(), ticket.clone());
        Ok(())
    }

    async fn tickets_for_draw(&self, game: GameType, draw_id: &DrawId) -> AppResult<Vec<Ticket>> {
        let tickets = self.tickets.read().await;
        let mut found: Vec<Ticket> = tickets
            .values()
            .filter(|t| t.game() == game && t.draws.iter().any(|d| &d.draw_id == draw_id))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(found)
    }
}
