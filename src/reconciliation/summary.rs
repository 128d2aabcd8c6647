// Weekly report handed to the notifier.
//
// Amounts serialize as both a decimal and the es-ES formatted string; the
// Display impls render the plain-text summary.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

use super::calendar::weekday_name;
use crate::draws::models::{short_ticket_id, DrawId, DrawResult, GameType};
use crate::draws::money::Money;
use crate::matching::HitDescriptor;
use crate::prizes::PrizeOutcome;

/// Which step a pending draw is stuck on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingStage {
    Result,
    PrizeTable,
    /// Data is stored but reading it back for evaluation failed
    Evaluation,
}

/// A draw whose data could not be obtained during the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingDraw {
    pub game: GameType,
    pub date: NaiveDate,
    pub stage: PendingStage,
    pub reason: String,
}

/// Where one draw date ended up after the data check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum CheckState {
    /// Already in the store
    Present,
    /// Fetched and stored during this run
    Stored,
    /// Fetch failed or returned nothing
    Pending(String),
    /// Publication time not reached; not attempted
    NotDue,
    /// Not attempted because the previous stage is missing or updates are off
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawCheck {
    pub game: GameType,
    pub date: NaiveDate,
    pub result: CheckState,
    pub prizes: CheckState,
}

/// One ticket's outcome on one draw
#[derive(Debug, Clone, Serialize)]
pub struct TicketLine {
    pub ticket_id: String,
    pub draw_id: DrawId,
    pub hit: HitDescriptor,
    pub outcome: PrizeOutcome,
}

impl TicketLine {
    pub fn short_id(&self) -> &str {
        short_ticket_id(&self.ticket_id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GameSummary {
    pub game: GameType,
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// Draws evaluated this week, ordered by date
    pub draws: Vec<DrawResult>,
    pub lines: Vec<TicketLine>,
    /// Tickets with a settled prize; pending outcomes are not counted
    pub winners: usize,
    pub total: Money,
    /// Draws of this game left pending by the run
    pub pending: Vec<PendingDraw>,
}

impl GameSummary {
    pub fn new(game: GameType, from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            game,
            from,
            to,
            draws: Vec::new(),
            lines: Vec::new(),
            winners: 0,
            total: Money::ZERO,
            pending: Vec::new(),
        }
    }

    pub fn push_line(&mut self, line: TicketLine) {
        if !line.outcome.is_pending() {
            self.winners += 1;
            if let Some(total) = line.outcome.total() {
                self.total += total;
            }
        }
        self.lines.push(line);
    }

    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }

    /// Lines ordered by short ticket id, as printed
    pub fn sort_lines(&mut self) {
        self.lines
            .sort_by(|a, b| a.short_id().cmp(b.short_id()).then_with(|| a.draw_id.cmp(&b.draw_id)));
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklyReport {
    pub run_id: Uuid,
    pub monday: NaiveDate,
    pub sunday: NaiveDate,
    pub auto_update: bool,
    pub checks: Vec<DrawCheck>,
    pub games: Vec<GameSummary>,
    pub pending: Vec<PendingDraw>,
    pub total: Money,
}

impl WeeklyReport {
    pub fn game(&self, game: GameType) -> Option<&GameSummary> {
        self.games.iter().find(|g| g.game == game)
    }

    pub fn winners(&self) -> usize {
        self.games.iter().map(|g| g.winners).sum()
    }

    /// Pending dates per game, deduplicated and sorted, in reporting order
    pub fn pending_by_game(&self) -> Vec<(GameType, Vec<NaiveDate>)> {
        GameType::all()
            .into_iter()
            .filter_map(|game| {
                let dates: BTreeSet<NaiveDate> = self
                    .pending
                    .iter()
                    .filter(|p| p.game == game)
                    .map(|p| p.date)
                    .collect();
                if dates.is_empty() {
                    None
                } else {
                    Some((game, dates.into_iter().collect()))
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RangeReport {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub weeks: Vec<WeeklyReport>,
    pub total: Money,
}

// ========== TEXT RENDERING ==========

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

fn amount_or_unknown(amount: Option<Money>) -> String {
    amount
        .map(|m| m.formatted())
        .unwrap_or_else(|| "no prize assigned".to_string())
}

impl fmt::Display for TicketLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "🎯 Ticket {}", self.short_id())?;
        write!(f, "   {}", self.hit.describe())?;
        match &self.outcome {
            PrizeOutcome::Pending { category } => {
                write!(f, " → Category {} → prize table not published yet", category)
            }
            PrizeOutcome::Paid(payout) => {
                if payout.category.carries_key_supplement() {
                    write!(
                        f,
                        " → Category {} ({})",
                        payout.label,
                        amount_or_unknown(payout.category_amount)
                    )?;
                    if let Some(supplement) = payout.key_supplement {
                        write!(f, " + Reseed ({})", supplement)?;
                    }
                    write!(f, " → Total {}", amount_or_unknown(payout.total))
                } else {
                    write!(
                        f,
                        " → Category {} → {}",
                        payout.label,
                        amount_or_unknown(payout.total)
                    )
                }
            }
        }
    }
}

impl fmt::Display for GameSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.draws.is_empty() {
            return write!(
                f,
                "ℹ️ No {} draws between {} and {}.",
                self.game, self.from, self.to
            );
        }

        writeln!(f, "💰 {} results ({}):", self.game, self.from)?;
        writeln!(f, "📅 {} this week", plural(self.draws.len(), "draw"))?;
        for draw in &self.draws {
            writeln!(f, "{}", draw.headline())?;
        }

        if self.lines.is_empty() {
            return write!(f, "✔️ No winning tickets for {} this week.", self.game);
        }

        writeln!(f)?;
        let rendered: Vec<String> = self.lines.iter().map(|l| l.to_string()).collect();
        write!(f, "{}", rendered.join("\n"))
    }
}

impl fmt::Display for WeeklyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📆 Week check (Monday {}):", self.monday)?;
        writeln!(f)?;
        for game in &self.games {
            writeln!(f, "{}", game)?;
            writeln!(f)?;
        }

        writeln!(f, "📊 Week summary:")?;
        for game in &self.games {
            writeln!(
                f,
                "- {}: {} → {}",
                game.game,
                plural(game.winners, "winning ticket"),
                game.total
            )?;
        }
        writeln!(f)?;
        writeln!(f, "💵 TOTAL WON THIS WEEK: {}", self.total)?;

        let pending = self.pending_by_game();
        if !pending.is_empty() {
            writeln!(f)?;
            writeln!(f, "⚠️ Draws pending publication:")?;
            for (game, dates) in pending {
                let listed: Vec<String> = dates
                    .iter()
                    .map(|d| format!("{} {}", weekday_name(*d), d))
                    .collect();
                writeln!(f, "- {}: {} → {}", game, listed.join(", "), game.publication_hint())?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for RangeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for week in &self.weeks {
            writeln!(f, "{}", week)?;
            writeln!(f, "----------------------------------------")?;
        }
        writeln!(
            f,
            "💵 GRAND TOTAL {} → {} ({}): {}",
            self.from,
            self.to,
            plural(self.weeks.len(), "week"),
            self.total
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draws::models::HitCategory;
    use crate::prizes::resolver::Payout;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn key_line(id: &str) -> TicketLine {
        let category = HitCategory::parse(GameType::FiveKey, "2+C").unwrap();
        TicketLine {
            ticket_id: id.to_string(),
            draw_id: DrawId::from_number(2),
            hit: HitDescriptor::FiveKey {
                numbers_matched: 2,
                key_matched: true,
            },
            outcome: PrizeOutcome::Paid(Payout {
                category,
                label: "7ª".to_string(),
                category_amount: Some(Money(dec!(8))),
                key_supplement: Some(Money(dec!(2))),
                total: Some(Money(dec!(10))),
                fully_resolved: true,
            }),
        }
    }

    #[test]
    fn test_key_line_shows_supplement_breakdown() {
        let rendered = key_line("GORDO-0004321").to_string();
        assert_eq!(
            rendered,
            "🎯 Ticket 04321\n   2 numbers + key → Category 7ª (8,00 €) + Reseed (2,00 €) → Total 10,00 €"
        );
    }

    #[test]
    fn test_pending_outcome_not_counted() {
        let mut summary = GameSummary::new(GameType::FiveKey, date(2025, 1, 6), date(2025, 1, 12));
        summary.push_line(key_line("B-2"));
        summary.push_line(TicketLine {
            ticket_id: "A-1".to_string(),
            draw_id: DrawId::from_number(2),
            hit: HitDescriptor::FiveKey {
                numbers_matched: 3,
                key_matched: false,
            },
            outcome: PrizeOutcome::Pending {
                category: HitCategory::parse(GameType::FiveKey, "3").unwrap(),
            },
        });
        summary.sort_lines();

        assert_eq!(summary.winners, 1);
        assert_eq!(summary.total, Money(dec!(10)));
        assert_eq!(summary.lines[0].ticket_id, "A-1");
    }

    #[test]
    fn test_pending_grouped_by_game_with_weekdays() {
        let report = WeeklyReport {
            run_id: Uuid::new_v4(),
            monday: date(2025, 1, 6),
            sunday: date(2025, 1, 12),
            auto_update: true,
            checks: vec![],
            games: vec![GameSummary::new(GameType::FiveKey, date(2025, 1, 6), date(2025, 1, 12))],
            pending: vec![
                PendingDraw {
                    game: GameType::FiveStar,
                    date: date(2025, 1, 10),
                    stage: PendingStage::PrizeTable,
                    reason: "HTTP status 500".to_string(),
                },
                PendingDraw {
                    game: GameType::FiveStar,
                    date: date(2025, 1, 7),
                    stage: PendingStage::Result,
                    reason: "not published".to_string(),
                },
                PendingDraw {
                    game: GameType::FiveStar,
                    date: date(2025, 1, 7),
                    stage: PendingStage::Result,
                    reason: "retry".to_string(),
                },
            ],
            total: Money::ZERO,
        };

        let grouped = report.pending_by_game();
        assert_eq!(grouped, vec![(GameType::FiveStar, vec![date(2025, 1, 7), date(2025, 1, 10)])]);

        let text = report.to_string();
        assert!(text.contains("- five_star: Tuesday 2025-01-07, Friday 2025-01-10 → usually after midnight"));
        assert!(text.contains("ℹ️ No five_key draws between 2025-01-06 and 2025-01-12."));
        assert!(text.contains("💵 TOTAL WON THIS WEEK: 0,00 €"));
    }
}
