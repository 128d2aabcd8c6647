use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use super::cache::{PrizeCache, PrizeTable};
use crate::draws::models::{DrawId, GameType, HitCategory};
use crate::draws::money::Money;
use crate::error::{AppResult, MatchError};
use crate::matching::HitDescriptor;
use crate::store::ResultStore;

/// Code of the key-only refund whose amount is added to every "+C" tier
const KEY_SUPPLEMENT_CODE: &str = "R";

/// What a ticket earns for one draw
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PrizeOutcome {
    /// Category won, but the draw's prize table has no entry for it yet
    Pending { category: HitCategory },
    Paid(Payout),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payout {
    pub category: HitCategory,
    pub label: String,
    /// Amount of the category alone
    pub category_amount: Option<Money>,
    /// Separately published "R" amount added to key-number "+C" tiers
    pub key_supplement: Option<Money>,
    pub total: Option<Money>,
    /// False when an amount could not be read or the supplement is missing
    pub fully_resolved: bool,
}

impl PrizeOutcome {
    pub fn category(&self) -> HitCategory {
        match self {
            PrizeOutcome::Pending { category } => *category,
            PrizeOutcome::Paid(payout) => payout.category,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, PrizeOutcome::Pending { .. })
    }

    /// Amount that counts towards totals; `None` while unknown
    pub fn total(&self) -> Option<Money> {
        match self {
            PrizeOutcome::Pending { .. } => None,
            PrizeOutcome::Paid(payout) => payout.total,
        }
    }
}

/// Maps hit descriptors to payouts using the draw's prize table.
///
/// Each resolver owns a fresh cache, so create one per reconciliation run.
pub struct PrizeResolver {
    store: Arc<dyn ResultStore>,
    cache: PrizeCache,
}

impl PrizeResolver {
    pub fn new(store: Arc<dyn ResultStore>) -> Self {
        Self {
            store,
            cache: PrizeCache::new(),
        }
    }

    pub fn cache(&self) -> &PrizeCache {
        &self.cache
    }

    /// Prize table of a draw, read from the store at most once per run
    pub async fn prize_table(&self, game: GameType, draw_id: &DrawId, year: i32) -> AppResult<Arc<PrizeTable>> {
        if let Some(table) = self.cache.get(game, draw_id, year).await {
            return Ok(table);
        }
        let entries = self.store.prize_table(game, draw_id, year).await?;
        Ok(self.cache.insert(game, draw_id, year, entries).await)
    }

    /// `None` when the hit reaches no prize tier. `draw_date` picks the year
    /// the draw id belongs to.
    pub async fn resolve(
        &self,
        game: GameType,
        draw_id: &DrawId,
        draw_date: NaiveDate,
        hit: &HitDescriptor,
    ) -> AppResult<Option<PrizeOutcome>> {
        if hit.game() != game {
            return Err(MatchError::GameMismatch {
                ticket: hit.game(),
                result: game,
            }
            .into());
        }

        let category = match hit.category() {
            Some(category) => category,
            None => return Ok(None),
        };

        let table = self.prize_table(game, draw_id, draw_date.year()).await?;
        let entry = match table.get(category.code()) {
            Some(entry) => entry,
            None => {
                debug!("⏳ No {} entry for {} draw {} yet", category, game, draw_id);
                return Ok(Some(PrizeOutcome::Pending { category }));
            }
        };

        let category_amount = entry.amount.map(Money);
        let (key_supplement, total, fully_resolved) = if category.carries_key_supplement() {
            let supplement = table
                .get(KEY_SUPPLEMENT_CODE)
                .and_then(|r| r.amount)
                .map(Money);
            let total = category_amount.map(|a| a + supplement.unwrap_or(Money::ZERO));
            (supplement, total, category_amount.is_some() && supplement.is_some())
        } else {
            (None, category_amount, category_amount.is_some())
        };

        Ok(Some(PrizeOutcome::Paid(Payout {
            category,
            label: entry.label.clone(),
            category_amount,
            key_supplement,
            total,
            fully_resolved,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draws::models::PrizeTableEntry;
    use crate::store::InMemoryResultStore;
    use rust_decimal_macros::dec;

    fn draw_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 16).unwrap()
    }

    fn key_entry(code: &str, label: &str, amount: &str) -> PrizeTableEntry {
        PrizeTableEntry::from_published(
            GameType::FiveKey,
            DrawId::from_number(7),
            draw_date(),
            code,
            label,
            amount,
        )
        .unwrap()
    }

    async fn resolver_with(entries: Vec<PrizeTableEntry>) -> PrizeResolver {
        let store = Arc::new(InMemoryResultStore::new());
        store.upsert_prize_entries(&entries).await.unwrap();
        PrizeResolver::new(store)
    }

    fn two_plus_key() -> HitDescriptor {
        HitDescriptor::FiveKey {
            numbers_matched: 2,
            key_matched: true,
        }
    }

    fn paid(outcome: Option<PrizeOutcome>) -> Payout {
        match outcome {
            Some(PrizeOutcome::Paid(payout)) => payout,
            other => panic!("expected a payout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_key_supplement_added_to_plus_c() {
        let resolver = resolver_with(vec![
            key_entry("2+C", "7ª (2 Aciertos+C)", "8,00 €"),
            key_entry("R", "Reintegro", "2,00 €"),
        ])
        .await;

        let payout = paid(
            resolver
                .resolve(GameType::FiveKey, &DrawId::from_number(7), draw_date(), &two_plus_key())
                .await
                .unwrap(),
        );

        assert_eq!(payout.category.code(), "2+C");
        assert_eq!(payout.category_amount, Some(Money(dec!(8.00))));
        assert_eq!(payout.key_supplement, Some(Money(dec!(2.00))));
        assert_eq!(payout.total, Some(Money(dec!(10.00))));
        assert!(payout.fully_resolved);
        assert!(payout.total >= payout.category_amount);
    }

    #[tokio::test]
    async fn test_missing_supplement_keeps_category_amount() {
        let resolver = resolver_with(vec![key_entry("2+C", "7ª", "8,00 €")]).await;

        let payout = paid(
            resolver
                .resolve(GameType::FiveKey, &DrawId::from_number(7), draw_date(), &two_plus_key())
                .await
                .unwrap(),
        );

        assert_eq!(payout.total, payout.category_amount);
        assert_eq!(payout.key_supplement, None);
        assert!(!payout.fully_resolved);
    }

    #[tokio::test]
    async fn test_unreadable_supplement_is_not_fully_resolved() {
        let resolver = resolver_with(vec![
            key_entry("2+C", "7ª", "8,00 €"),
            key_entry("R", "Reintegro", "No disponible"),
        ])
        .await;

        let payout = paid(
            resolver
                .resolve(GameType::FiveKey, &DrawId::from_number(7), draw_date(), &two_plus_key())
                .await
                .unwrap(),
        );

        assert_eq!(payout.total, Some(Money(dec!(8.00))));
        assert!(!payout.fully_resolved);
    }

    #[tokio::test]
    async fn test_key_only_refund_has_no_supplement() {
        let resolver = resolver_with(vec![key_entry("R", "Reintegro", "1,50 €")]).await;
        let hit = HitDescriptor::FiveKey {
            numbers_matched: 1,
            key_matched: true,
        };

        let payout = paid(
            resolver
                .resolve(GameType::FiveKey, &DrawId::from_number(7), draw_date(), &hit)
                .await
                .unwrap(),
        );

        assert_eq!(payout.total, Some(Money(dec!(1.50))));
        assert_eq!(payout.key_supplement, None);
        assert!(payout.fully_resolved);
    }

    #[tokio::test]
    async fn test_missing_entry_is_pending() {
        let resolver = resolver_with(vec![]).await;
        let hit = HitDescriptor::SixNumber {
            numbers_matched: 3,
            complement_matched: false,
            reseed_matched: false,
        };

        let outcome = resolver
            .resolve(GameType::SixNumber, &DrawId::from_number(7), draw_date(), &hit)
            .await
            .unwrap()
            .unwrap();

        assert!(outcome.is_pending());
        assert_eq!(outcome.category().code(), "3");
        assert_eq!(outcome.total(), None);
    }

    #[tokio::test]
    async fn test_no_category_resolves_to_none() {
        let resolver = resolver_with(vec![]).await;
        let hit = HitDescriptor::FiveStar {
            numbers_matched: 1,
            stars_matched: 0,
        };

        let outcome = resolver
            .resolve(GameType::FiveStar, &DrawId::from_number(7), draw_date(), &hit)
            .await
            .unwrap();
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn test_prize_table_read_once_per_run() {
        let resolver = resolver_with(vec![
            key_entry("2+C", "7ª", "8,00 €"),
            key_entry("R", "Reintegro", "2,00 €"),
        ])
        .await;
        let draw = DrawId::from_number(7);

        for _ in 0..3 {
            resolver
                .resolve(GameType::FiveKey, &draw, draw_date(), &two_plus_key())
                .await
                .unwrap();
        }

        assert_eq!(resolver.cache().stats(), (2, 1));
    }

    #[tokio::test]
    async fn test_game_mismatch_rejected() {
        let resolver = resolver_with(vec![]).await;
        let result = resolver
            .resolve(GameType::SixNumber, &DrawId::from_number(7), draw_date(), &two_plus_key())
            .await;
        assert!(result.is_err());
    }
}
