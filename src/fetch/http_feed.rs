use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::traits::DrawFetcher;
use crate::draws::models::{DrawId, DrawResult, GameType, PrizeTableEntry, RawDrawResult};
use crate::error::FetchError;

/// Prize table as served by the feed
#[derive(Debug, Deserialize)]
struct FeedPrizeTable {
    draw: String,
    date: Option<NaiveDate>,
    entries: Vec<FeedPrizeEntry>,
}

#[derive(Debug, Deserialize)]
struct FeedPrizeEntry {
    category: String,
    label: String,
    /// Locale-formatted amount ("1.234,56 €")
    amount: String,
}

/// Client for a JSON results feed laid out as
/// `{base}/{game}/{date}/result` and `{base}/{game}/{date}/prizes`.
/// A 404 means the draw is not published yet.
pub struct HttpFeedFetcher {
    base_url: String,
    client: Client,
}

impl HttpFeedFetcher {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, game: GameType, date: NaiveDate, resource: &str) -> String {
        format!("{}/{}/{}/{}", self.base_url, game, date.format("%Y-%m-%d"), resource)
    }

    /// `Ok(None)` on 404
    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<Option<T>, FetchError> {
        debug!("🌐 GET {}", url);
        let response = self.client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        Ok(Some(response.json::<T>().await?))
    }
}

/// Typed result from a feed payload, checked against the request
fn result_from_feed(game: GameType, date: NaiveDate, mut raw: RawDrawResult) -> Result<DrawResult, FetchError> {
    if raw.game.trim().is_empty() {
        raw.game = game.as_str().to_string();
    }
    if raw.date.is_none() {
        raw.date = Some(date);
    }

    let result = DrawResult::try_from(raw).map_err(|e| FetchError::Malformed(e.to_string()))?;
    if result.game() != game {
        return Err(FetchError::Malformed(format!(
            "asked for {} but feed returned {}",
            game,
            result.game()
        )));
    }
    if result.date != date {
        return Err(FetchError::Malformed(format!(
            "asked for {} draw of {} but feed returned {}",
            game, date, result.date
        )));
    }
    Ok(result)
}

/// Entries with a category outside the game's vocabulary are dropped
fn prize_table_from_feed(game: GameType, date: NaiveDate, table: FeedPrizeTable) -> Result<Vec<PrizeTableEntry>, FetchError> {
    let draw_id = DrawId::parse(&table.draw).map_err(|e| FetchError::Malformed(e.to_string()))?;
    let date = table.date.unwrap_or(date);

    let mut entries = Vec::with_capacity(table.entries.len());
    for entry in table.entries {
        match PrizeTableEntry::from_published(game, draw_id.clone(), date, &entry.category, &entry.label, &entry.amount) {
            Ok(parsed) => entries.push(parsed),
            Err(e) => warn!("⚠️ Skipping prize row {:?} of {} draw {}: {}", entry.label, game, draw_id, e),
        }
    }
    Ok(entries)
}

#[async_trait]
impl DrawFetcher for HttpFeedFetcher {
    fn name(&self) -> &'static str {
        "http_feed"
    }

    async fn fetch_draw_result(&self, game: GameType, date: NaiveDate) -> Result<Option<DrawResult>, FetchError> {
        let url = self.url(game, date, "result");
        let raw = match self.get_json::<RawDrawResult>(&url).await? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        let result = result_from_feed(game, date, raw)?;
        info!("✅ Fetched {} draw {} ({})", game, result.draw_id, date);
        Ok(Some(result))
    }

    async fn fetch_prize_table(&self, game: GameType, date: NaiveDate) -> Result<Vec<PrizeTableEntry>, FetchError> {
        let url = self.url(game, date, "prizes");
        let table = match self.get_json::<FeedPrizeTable>(&url).await? {
            Some(table) => table,
            None => return Ok(Vec::new()),
        };

        let entries = prize_table_from_feed(game, date, table)?;
        info!("✅ Fetched {} prize entries for {} ({})", entries.len(), game, date);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()
    }

    #[test]
    fn test_feed_urls() {
        let fetcher = HttpFeedFetcher::new("http://feed.local/v1/", 5).unwrap();
        assert_eq!(
            fetcher.url(GameType::FiveStar, date(), "result"),
            "http://feed.local/v1/five_star/2025-03-04/result"
        );
    }

    #[test]
    fn test_result_payload_fills_game_and_date() {
        let raw: RawDrawResult = serde_json::from_value(serde_json::json!({
            "draw": "2025/018",
            "numbers": "03 14 25 40 50",
            "stars": "2,9",
            "bonus_code": "ABC12345"
        }))
        .unwrap();

        let result = result_from_feed(GameType::FiveStar, date(), raw).unwrap();
        assert_eq!(result.draw_id.as_str(), "018");
        assert_eq!(result.date, date());
        assert_eq!(result.game(), GameType::FiveStar);
    }

    #[test]
    fn test_result_payload_for_wrong_game_is_malformed() {
        let raw: RawDrawResult = serde_json::from_value(serde_json::json!({
            "game": "gordo",
            "draw": "9",
            "date": "2025-03-04",
            "numbers": "1,2,3,4,5",
            "key": "3"
        }))
        .unwrap();

        assert!(matches!(
            result_from_feed(GameType::FiveStar, date(), raw),
            Err(FetchError::Malformed(_))
        ));
    }

    #[test]
    fn test_prize_payload_skips_unknown_categories() {
        let table: FeedPrizeTable = serde_json::from_value(serde_json::json!({
            "draw": "018",
            "entries": [
                { "category": "5+2", "label": "1a", "amount": "17.000.000,00 €" },
                { "category": "2+0", "label": "13a", "amount": "3,90 €" },
                { "category": "0+1", "label": "??", "amount": "0,00 €" }
            ]
        }))
        .unwrap();

        let entries = prize_table_from_feed(GameType::FiveStar, date(), table).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].label, "1ª");
        assert_eq!(entries[0].amount, Some(dec!(17000000)));
        assert_eq!(entries[1].date, date());
    }
}
