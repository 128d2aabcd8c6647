use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

use super::{newest_per_category, ResultStore};
use crate::draws::models::{
    Digit, DrawId, DrawResult, GameType, HitCategory, Number, PrizeTableEntry, RawDrawRef,
    RawDrawResult, RawTicket, Ticket, TicketPlay, WinningNumbers,
};
use crate::error::{AppError, AppResult};

/// Postgres-backed store. Draw ids are text columns; numbers are kept as
/// comma-separated two-digit strings.
pub struct PgResultStore {
    pub pool: PgPool,
}

#[derive(Debug, FromRow)]
struct DrawResultRow {
    game: GameType,
    draw_id: String,
    draw_date: NaiveDate,
    numbers: String,
    complement: Option<String>,
    reseed: Option<String>,
    stars: Option<String>,
    bonus_code: Option<String>,
    key_number: Option<String>,
}

impl TryFrom<DrawResultRow> for DrawResult {
    type Error = crate::error::MatchError;

    fn try_from(row: DrawResultRow) -> Result<Self, Self::Error> {
        DrawResult::try_from(RawDrawResult {
            game: row.game.as_str().to_string(),
            draw: row.draw_id,
            date: Some(row.draw_date),
            numbers: row.numbers,
            complement: row.complement,
            reseed: row.reseed,
            stars: row.stars,
            bonus_code: row.bonus_code,
            key: row.key_number,
        })
    }
}

#[derive(Debug, FromRow)]
struct PrizeEntryRow {
    game: GameType,
    draw_id: String,
    draw_date: NaiveDate,
    category: String,
    label: String,
    amount: Option<Decimal>,
    amount_text: String,
}

impl TryFrom<PrizeEntryRow> for PrizeTableEntry {
    type Error = crate::error::MatchError;

    fn try_from(row: PrizeEntryRow) -> Result<Self, Self::Error> {
        Ok(PrizeTableEntry {
            game: row.game,
            draw_id: DrawId::parse(&row.draw_id)?,
            date: row.draw_date,
            category: HitCategory::parse(row.game, &row.category)?,
            label: row.label,
            amount: row.amount,
            amount_text: row.amount_text,
        })
    }
}

#[derive(Debug, FromRow)]
struct TicketRow {
    id: String,
    game: GameType,
    numbers: String,
    reseed: Option<String>,
    stars: Option<String>,
    key_number: Option<String>,
}

#[derive(Debug, FromRow)]
struct TicketDrawRow {
    ticket_id: String,
    draw_id: String,
    draw_date: NaiveDate,
}

fn join_numbers(set: &BTreeSet<Number>) -> String {
    set.iter().map(Number::as_str).collect::<Vec<_>>().join(",")
}

fn digit_text(digit: &Option<Digit>) -> Option<String> {
    digit.as_ref().map(|d| d.as_str().to_string())
}

/// Prize rows of one draw id: plain ids compare as stored, legacy "YYYY/NNN"
/// ids compare on their suffix without leading zeros. `$3`/`$4` bound the year.
const PRIZE_ROWS_OF_DRAW: &str = r#"
    game = $1
    AND (
        draw_id = $2
        OR (
            strpos(draw_id, '/') > 0
            AND LTRIM(TRIM(split_part(draw_id, '/', 2)), '0') = LTRIM($2, '0')
        )
    )
    AND draw_date BETWEEN $3 AND $4
"#;

/// First and last day of `year`
fn year_bounds(year: i32) -> AppResult<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, 1, 1);
    let last = NaiveDate::from_ymd_opt(year, 12, 31);
    first
        .zip(last)
        .ok_or_else(|| AppError::InvalidInput(format!("year out of range: {}", year)))
}

impl PgResultStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResultStore for PgResultStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // ========== DRAW RESULTS ==========

    async fn has_result(&self, game: GameType, date: NaiveDate) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(SELECT 1 FROM draw_results WHERE game = $1 AND draw_date = $2)
            "#,
        )
        .bind(game)
        .bind(date)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn find_result_by_date(&self, game: GameType, date: NaiveDate) -> AppResult<Option<DrawResult>> {
        let row = sqlx::query_as::<_, DrawResultRow>(
            r#"
            SELECT game, draw_id, draw_date, numbers, complement, reseed, stars, bonus_code, key_number
            FROM draw_results
            WHERE game = $1 AND draw_date = $2
            ORDER BY draw_id
            LIMIT 1
            "#,
        )
        .bind(game)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(DrawResult::try_from).transpose()?)
    }

    async fn results_between(&self, game: GameType, from: NaiveDate, to: NaiveDate) -> AppResult<Vec<DrawResult>> {
        let rows = sqlx::query_as::<_, DrawResultRow>(
            r#"
            SELECT game, draw_id, draw_date, numbers, complement, reseed, stars, bonus_code, key_number
            FROM draw_results
            WHERE game = $1 AND draw_date BETWEEN $2 AND $3
            ORDER BY draw_date, draw_id
            "#,
        )
        .bind(game)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(DrawResult::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn upsert_result(&self, result: &DrawResult) -> AppResult<()> {
        let (complement, reseed, stars, bonus_code, key_number) = match &result.winning {
            WinningNumbers::SixNumber { complement, reseed, .. } => (
                complement.as_ref().map(|c| c.as_str().to_string()),
                digit_text(reseed),
                None,
                None,
                None,
            ),
            WinningNumbers::FiveStar { stars, bonus_code, .. } => {
                (None, None, Some(join_numbers(stars)), bonus_code.clone(), None)
            }
            WinningNumbers::FiveKey { key, .. } => (None, None, None, None, digit_text(key)),
        };

        // Existing rows only gain supplementary fields that were still unknown
        sqlx::query(
            r#"
            INSERT INTO draw_results
                (game, draw_id, draw_date, numbers, complement, reseed, stars, bonus_code, key_number)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (game, draw_id) DO UPDATE SET
                complement = COALESCE(draw_results.complement, EXCLUDED.complement),
                reseed = COALESCE(draw_results.reseed, EXCLUDED.reseed),
                stars = COALESCE(draw_results.stars, EXCLUDED.stars),
                bonus_code = COALESCE(draw_results.bonus_code, EXCLUDED.bonus_code),
                key_number = COALESCE(draw_results.key_number, EXCLUDED.key_number),
                updated_at = NOW()
            "#,
        )
        .bind(result.game())
        .bind(result.draw_id.as_str())
        .bind(result.date)
        .bind(join_numbers(result.winning.numbers()))
        .bind(complement)
        .bind(reseed)
        .bind(stars)
        .bind(bonus_code)
        .bind(key_number)
        .execute(&self.pool)
        .await?;

        info!("💾 Stored {} draw {} ({})", result.game(), result.draw_id, result.date);
        Ok(())
    }

    // ========== PRIZE TABLES ==========

    async fn has_prize_table(&self, game: GameType, draw_id: &DrawId, date: NaiveDate) -> AppResult<bool> {
        let (first, last) = year_bounds(date.year())?;
        let query = format!("SELECT EXISTS(SELECT 1 FROM prize_entries WHERE {})", PRIZE_ROWS_OF_DRAW);

        let exists: bool = sqlx::query_scalar(&query)
            .bind(game)
            .bind(draw_id.as_str())
            .bind(first)
            .bind(last)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn prize_table(&self, game: GameType, draw_id: &DrawId, year: i32) -> AppResult<Vec<PrizeTableEntry>> {
        let (first, last) = year_bounds(year)?;
        let query = format!(
            "SELECT game, draw_id, draw_date, category, label, amount, amount_text \
             FROM prize_entries WHERE {} ORDER BY draw_date DESC",
            PRIZE_ROWS_OF_DRAW
        );

        let rows = sqlx::query_as::<_, PrizeEntryRow>(&query)
            .bind(game)
            .bind(draw_id.as_str())
            .bind(first)
            .bind(last)
            .fetch_all(&self.pool)
            .await?;

        let entries = rows
            .into_iter()
            .map(PrizeTableEntry::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(newest_per_category(entries))
    }

    async fn upsert_prize_entries(&self, entries: &[PrizeTableEntry]) -> AppResult<usize> {
        let mut tx = self.pool.begin().await?;

        for entry in entries {
            sqlx::query(
                r#"
                INSERT INTO prize_entries
                    (game, draw_id, draw_date, category, label, amount, amount_text)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (game, draw_id, category) DO UPDATE SET
                    draw_date = EXCLUDED.draw_date,
                    label = EXCLUDED.label,
                    amount = EXCLUDED.amount,
                    amount_text = EXCLUDED.amount_text,
                    updated_at = NOW()
                "#,
            )
            .bind(entry.game)
            .bind(entry.draw_id.as_str())
            .bind(entry.date)
            .bind(entry.category.code())
            .bind(&entry.label)
            .bind(entry.amount)
            .bind(&entry.amount_text)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!("💾 Stored {} prize entries", entries.len());
        Ok(entries.len())
    }

    // ========== TICKETS ==========

    async fn upsert_ticket(&self, ticket: &Ticket) -> AppResult<()> {
        let (reseed, stars, key_number) = match &ticket.play {
            TicketPlay::SixNumber { reseed, .. } => (digit_text(reseed), None, None),
            TicketPlay::FiveStar { stars, .. } => (None, Some(join_numbers(stars)), None),
            TicketPlay::FiveKey { key, .. } => (None, None, digit_text(key)),
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO tickets (id, game, numbers, reseed, stars, key_number)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                game = EXCLUDED.game,
                numbers = EXCLUDED.numbers,
                reseed = EXCLUDED.reseed,
                stars = EXCLUDED.stars,
                key_number = EXCLUDED.key_number
            "#,
        )
        .bind(&ticket.id)
        .bind(ticket.game())
        .bind(join_numbers(ticket.play.numbers()))
        .bind(reseed)
        .bind(stars)
        .bind(key_number)
        .execute(&mut *tx)
        .await?;

        for draw in &ticket.draws {
            sqlx::query(
                r#"
                INSERT INTO ticket_draws (ticket_id, draw_id, draw_date)
                VALUES ($1, $2, $3)
                ON CONFLICT (ticket_id, draw_id) DO UPDATE SET draw_date = EXCLUDED.draw_date
                "#,
            )
            .bind(&ticket.id)
            .bind(draw.draw_id.as_str())
            .bind(draw.date)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn tickets_for_draw(&self, game: GameType, draw_id: &DrawId) -> AppResult<Vec<Ticket>> {
        let rows = sqlx::query_as::<_, TicketRow>(
            r#"
            SELECT t.id, t.game, t.numbers, t.reseed, t.stars, t.key_number
            FROM tickets t
            WHERE t.game = $1
              AND EXISTS (SELECT 1 FROM ticket_draws d WHERE d.ticket_id = t.id AND d.draw_id = $2)
            ORDER BY t.id
            "#,
        )
        .bind(game)
        .bind(draw_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
        let draw_rows = sqlx::query_as::<_, TicketDrawRow>(
            r#"
            SELECT ticket_id, draw_id, draw_date
            FROM ticket_draws
            WHERE ticket_id = ANY($1)
            ORDER BY draw_date
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut draws_by_ticket: HashMap<String, Vec<RawDrawRef>> = HashMap::new();
        for row in draw_rows {
            draws_by_ticket.entry(row.ticket_id).or_default().push(RawDrawRef {
                draw: row.draw_id,
                date: row.draw_date,
            });
        }

        let mut tickets = Vec::with_capacity(rows.len());
        for row in rows {
            let draws = draws_by_ticket.remove(&row.id).unwrap_or_default();
            tickets.push(Ticket::try_from(RawTicket {
                id: row.id,
                game: row.game.as_str().to_string(),
                numbers: row.numbers,
                reseed: row.reseed,
                stars: row.stars,
                key: row.key_number,
                draws,
            })?);
        }

        Ok(tickets)
    }
}
