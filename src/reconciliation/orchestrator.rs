// Weekly Reconciler - makes sure a week's draws and prize tables are stored,
// then evaluates every registered ticket against them.
//
// Per game and draw date:
//   result:  present | fetched -> stored | fetch failed -> pending
//   prizes:  present | fetched -> stored | fetch failed -> pending
// Fetches only happen for missing data and after the publication time.
// A failure is recorded and the run moves on to the next draw; the same
// holds when evaluating, where a store error only parks the draw it hit.

use chrono::{Datelike, NaiveDate};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::calendar::{draw_dates, monday_of, mondays_in_range, week_end, Clock, PublicationGate};
use super::notifier::{LogNotifier, WeeklyNotifier};
use super::summary::{
    CheckState, DrawCheck, GameSummary, PendingDraw, PendingStage, RangeReport, TicketLine, WeeklyReport,
};
use crate::draws::models::{DrawResult, GameType, Ticket};
use crate::draws::money::Money;
use crate::error::{AppError, AppResult, FetchError};
use crate::fetch::DrawFetcher;
use crate::matching;
use crate::prizes::PrizeResolver;
use crate::store::ResultStore;

pub struct WeeklyReconciler {
    store: Arc<dyn ResultStore>,
    fetcher: Arc<dyn DrawFetcher>,
    notifier: Arc<dyn WeeklyNotifier>,
    clock: Arc<dyn Clock>,
    gate: PublicationGate,
}

/// State owned by a single reconciliation run
struct Run<'a> {
    id: Uuid,
    owner: &'a WeeklyReconciler,
    resolver: PrizeResolver,
    checks: Vec<DrawCheck>,
    pending: Vec<PendingDraw>,
}

impl WeeklyReconciler {
    pub fn new(
        store: Arc<dyn ResultStore>,
        fetcher: Arc<dyn DrawFetcher>,
        clock: Arc<dyn Clock>,
        publication_hour: u32,
    ) -> Self {
        Self {
            store,
            fetcher,
            notifier: Arc::new(LogNotifier),
            clock,
            gate: PublicationGate::new(publication_hour),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn WeeklyNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    fn start_run(&self) -> Run<'_> {
        Run {
            id: Uuid::new_v4(),
            owner: self,
            resolver: PrizeResolver::new(self.store.clone()),
            checks: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Fetch whatever is missing for the week containing `monday`
    pub async fn ensure_week(&self, monday: NaiveDate) -> (Vec<DrawCheck>, Vec<PendingDraw>) {
        let mut run = self.start_run();
        run.ensure_week(monday_of(monday)).await;
        (run.checks, run.pending)
    }

    /// Reconcile one week and hand the report to the notifier.
    ///
    /// Only an unreachable store fails the call; everything else ends up
    /// as a pending entry in the report.
    pub async fn reconcile_week(&self, monday: NaiveDate, auto_update: bool) -> AppResult<WeeklyReport> {
        self.store.ping().await.map_err(|e| {
            error!("❌ Store {} unreachable: {}", self.store.name(), e);
            AppError::Config(format!("store {} unreachable: {}", self.store.name(), e))
        })?;

        let monday = monday_of(monday);
        let sunday = week_end(monday);
        info!("🏁 Week {} → {} (auto_update = {})", monday, sunday, auto_update);

        let mut run = self.start_run();
        debug!("Run {} started", run.id);
        if auto_update {
            run.ensure_week(monday).await;
        }

        let mut games = Vec::new();
        let mut total = Money::ZERO;
        for game in GameType::all() {
            let mut summary = run.evaluate_game(game, monday, sunday).await;
            summary.pending = run.pending.iter().filter(|p| p.game == game).cloned().collect();
            total += summary.total;
            games.push(summary);
        }

        let (hits, misses) = run.resolver.cache().stats();
        debug!("Prize cache: {} hits, {} misses", hits, misses);

        let report = WeeklyReport {
            run_id: run.id,
            monday,
            sunday,
            auto_update,
            checks: run.checks,
            games,
            pending: run.pending,
            total,
        };

        info!(
            "✓ Week {} done: {} winning tickets, {}, {} pending",
            monday,
            report.winners(),
            report.total,
            report.pending.len()
        );

        if let Err(e) = self.notifier.notify(&report).await {
            warn!("⚠️ Notifier failed for week {}: {}", monday, e);
        }

        Ok(report)
    }

    /// Reconcile every week from the week of `from` to the week of `to`
    pub async fn reconcile_range(&self, from: NaiveDate, to: NaiveDate, auto_update: bool) -> AppResult<RangeReport> {
        if to < from {
            return Err(AppError::InvalidInput(format!(
                "range end {} is before its start {}",
                to, from
            )));
        }

        let mut weeks = Vec::new();
        let mut total = Money::ZERO;
        for monday in mondays_in_range(from, to) {
            let report = self.reconcile_week(monday, auto_update).await?;
            total += report.total;
            weeks.push(report);
        }

        info!("💵 Range {} → {}: {} weeks, {}", from, to, weeks.len(), total);
        Ok(RangeReport {
            from,
            to,
            weeks,
            total,
        })
    }
}

impl<'a> Run<'a> {
    fn mark_pending(&mut self, game: GameType, date: NaiveDate, stage: PendingStage, reason: String) {
        warn!("⚠️ Pending: {} {} ({:?}): {}", game, date, stage, reason);
        self.pending.push(PendingDraw {
            game,
            date,
            stage,
            reason,
        });
    }

    async fn ensure_week(&mut self, monday: NaiveDate) {
        info!("🔍 Checking data for week {} → {}", monday, week_end(monday));
        for game in GameType::all() {
            for date in draw_dates(game, monday) {
                let check = self.check_draw(game, date).await;
                self.checks.push(check);
            }
        }
    }

    async fn check_draw(&mut self, game: GameType, date: NaiveDate) -> DrawCheck {
        let mut check = DrawCheck {
            game,
            date,
            result: CheckState::Skipped,
            prizes: CheckState::Skipped,
        };

        let (state, result) = self.ensure_result(game, date).await;
        check.result = state;

        if let Some(result) = result {
            check.prizes = self.ensure_prizes(&result).await;
        } else if check.result == CheckState::NotDue {
            check.prizes = CheckState::NotDue;
        }

        check
    }

    async fn ensure_result(&mut self, game: GameType, date: NaiveDate) -> (CheckState, Option<DrawResult>) {
        let owner = self.owner;

        match owner.store.find_result_by_date(game, date).await {
            Ok(Some(result)) => return (CheckState::Present, Some(result)),
            Ok(None) => {}
            Err(e) => {
                let reason = format!("store error: {}", e);
                self.mark_pending(game, date, PendingStage::Result, reason.clone());
                return (CheckState::Pending(reason), None);
            }
        }

        if !owner.gate.is_open(date, owner.clock.now()) {
            debug!("⏰ {} {} not due before {}", game, date, owner.gate.opens_at(date));
            return (CheckState::NotDue, None);
        }

        info!("🌐 Fetching {} result for {} via {}", game, date, owner.fetcher.name());
        let fetched = match owner.fetcher.fetch_draw_result(game, date).await {
            Ok(Some(result)) => result,
            Ok(None) => {
                let reason = FetchError::NotPublished { game, date }.to_string();
                self.mark_pending(game, date, PendingStage::Result, reason.clone());
                return (CheckState::Pending(reason), None);
            }
            Err(e) => {
                let reason = e.to_string();
                self.mark_pending(game, date, PendingStage::Result, reason.clone());
                return (CheckState::Pending(reason), None);
            }
        };

        match owner.store.upsert_result(&fetched).await {
            Ok(()) => (CheckState::Stored, Some(fetched)),
            Err(e) => {
                let reason = format!("store error: {}", e);
                self.mark_pending(game, date, PendingStage::Result, reason.clone());
                (CheckState::Pending(reason), None)
            }
        }
    }

    async fn ensure_prizes(&mut self, result: &DrawResult) -> CheckState {
        let owner = self.owner;
        let game = result.game();
        let date = result.date;

        match owner.store.has_prize_table(game, &result.draw_id, date).await {
            Ok(true) => return CheckState::Present,
            Ok(false) => {}
            Err(e) => {
                let reason = format!("store error: {}", e);
                self.mark_pending(game, date, PendingStage::PrizeTable, reason.clone());
                return CheckState::Pending(reason);
            }
        }

        if !owner.gate.is_open(date, owner.clock.now()) {
            return CheckState::NotDue;
        }

        info!("🌐 Fetching {} prize table for {} via {}", game, date, owner.fetcher.name());
        let entries = match owner.fetcher.fetch_prize_table(game, date).await {
            Ok(entries) if entries.is_empty() => {
                let reason = FetchError::NotPublished { game, date }.to_string();
                self.mark_pending(game, date, PendingStage::PrizeTable, reason.clone());
                return CheckState::Pending(reason);
            }
            Ok(entries) => entries,
            Err(e) => {
                let reason = e.to_string();
                self.mark_pending(game, date, PendingStage::PrizeTable, reason.clone());
                return CheckState::Pending(reason);
            }
        };

        match owner.store.upsert_prize_entries(&entries).await {
            Ok(written) => {
                for entry in &entries {
                    self.resolver
                        .cache()
                        .invalidate(game, &entry.draw_id, entry.date.year())
                        .await;
                }
                info!("💾 Stored {} prize entries for {} {}", written, game, date);
                CheckState::Stored
            }
            Err(e) => {
                let reason = format!("store error: {}", e);
                self.mark_pending(game, date, PendingStage::PrizeTable, reason.clone());
                CheckState::Pending(reason)
            }
        }
    }

    async fn evaluate_game(&mut self, game: GameType, monday: NaiveDate, sunday: NaiveDate) -> GameSummary {
        let mut summary = GameSummary::new(game, monday, sunday);

        let results = match self.owner.store.results_between(game, monday, sunday).await {
            Ok(results) => results,
            Err(e) => {
                for date in draw_dates(game, monday) {
                    self.mark_pending(game, date, PendingStage::Evaluation, format!("store error: {}", e));
                }
                return summary;
            }
        };

        for result in results {
            match self.evaluate_draw(&result).await {
                Ok(Some(lines)) => {
                    for line in lines {
                        summary.push_line(line);
                    }
                    summary.draws.push(result);
                }
                Ok(None) => {
                    debug!("Skipping {} draw {}: no prize table yet", game, result.draw_id);
                }
                Err(e) => {
                    let reason = format!("draw {} not evaluated: {}", result.draw_id, e);
                    self.mark_pending(game, result.date, PendingStage::Evaluation, reason);
                }
            }
        }

        summary.sort_lines();
        summary
    }

    /// Winning lines of one draw, `None` while a six-number draw has no prize table
    async fn evaluate_draw(&self, result: &DrawResult) -> AppResult<Option<Vec<TicketLine>>> {
        let store = &self.owner.store;
        let game = result.game();

        // Six-number draws only count as published once their prize table is in
        if game == GameType::SixNumber && !store.has_prize_table(game, &result.draw_id, result.date).await? {
            return Ok(None);
        }

        let mut lines = Vec::new();
        let tickets = store.tickets_for_draw(game, &result.draw_id).await?;
        for ticket in tickets.iter().filter(|t| plays_in(t, result)) {
            let hit = match matching::evaluate(ticket, result) {
                Ok(hit) => hit,
                Err(e) => {
                    warn!("⚠️ Ticket {} not evaluated: {}", ticket.id, e);
                    continue;
                }
            };

            if let Some(outcome) = self.resolver.resolve(game, &result.draw_id, result.date, &hit).await? {
                debug!("🎯 Ticket {} on {} draw {}: {}", ticket.short_id(), game, result.draw_id, outcome.category());
                lines.push(TicketLine {
                    ticket_id: ticket.id.clone(),
                    draw_id: result.draw_id.clone(),
                    hit,
                    outcome,
                });
            }
        }

        Ok(Some(lines))
    }
}

/// Draw numbers restart every year, so a reference must match the draw id
/// and the year of the draw
fn plays_in(ticket: &Ticket, result: &DrawResult) -> bool {
    ticket
        .draws
        .iter()
        .any(|d| d.draw_id == result.draw_id && d.date.year() == result.date.year())
}
