use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Datelike, NaiveDate, Utc};
use std::sync::Arc;
use tracing::info;

use super::models::*;
use crate::config::Config;
use crate::draws::models::{DrawId, GameType, RawTicket, Ticket};
use crate::error::{AppError, AppResult};
use crate::reconciliation::WeeklyReconciler;
use crate::store::ResultStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ResultStore>,
    pub reconciler: Arc<WeeklyReconciler>,
    pub config: Arc<Config>,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> AppResult<Json<HealthResponse>> {
    let status = match state.store.ping().await {
        Ok(()) => "healthy",
        Err(_) => "degraded",
    };

    Ok(Json(HealthResponse {
        status: status.to_string(),
        store: state.store.name().to_string(),
        timestamp: Utc::now(),
    }))
}

/// POST /weeks/:monday/reconcile - reconcile the week containing `monday`
pub async fn reconcile_week(
    State(state): State<AppState>,
    Path(monday): Path<NaiveDate>,
    Query(query): Query<ReconcileWeekQuery>,
) -> AppResult<Json<WeekResponse>> {
    let auto_update = query.auto_update.unwrap_or(state.config.auto_update);
    info!("📆 Reconcile request for week of {} (auto_update = {})", monday, auto_update);

    let report = state.reconciler.reconcile_week(monday, auto_update).await?;
    let summary = report.to_string();
    Ok(Json(WeekResponse { report, summary }))
}

/// POST /reconcile?from=&to= - reconcile every week in a date range
pub async fn reconcile_range(
    State(state): State<AppState>,
    Query(query): Query<ReconcileRangeQuery>,
) -> AppResult<Json<RangeResponse>> {
    let auto_update = query.auto_update.unwrap_or(state.config.auto_update);
    info!("📆 Reconcile request for {} → {}", query.from, query.to);

    let report = state
        .reconciler
        .reconcile_range(query.from, query.to, auto_update)
        .await?;
    let summary = report.to_string();
    Ok(Json(RangeResponse { report, summary }))
}

/// GET /draws/:game/:draw_id/prizes?year=2025
pub async fn get_prize_table(
    State(state): State<AppState>,
    Path((game, draw_id)): Path<(String, String)>,
    Query(query): Query<PrizeTableQuery>,
) -> AppResult<Json<PrizeTableResponse>> {
    let game: GameType = game.parse()?;
    let draw_id = DrawId::parse(&draw_id)?;
    let year = query.year.unwrap_or_else(|| Utc::now().year());

    let entries = state.store.prize_table(game, &draw_id, year).await?;
    if entries.is_empty() {
        return Err(AppError::NotFound(format!(
            "No prize table for {} draw {} in {}",
            game, draw_id, year
        )));
    }

    Ok(Json(PrizeTableResponse {
        game,
        draw_id,
        entries,
    }))
}

/// POST /tickets - register a ticket from its loosely-typed form
pub async fn register_ticket(
    State(state): State<AppState>,
    Json(raw): Json<RawTicket>,
) -> AppResult<(StatusCode, Json<Ticket>)> {
    let ticket = Ticket::try_from(raw)?;
    state.store.upsert_ticket(&ticket).await?;

    info!(
        "🎟️ Registered {} ticket {} for {} draw(s)",
        ticket.game(),
        ticket.short_id(),
        ticket.draws.len()
    );
    Ok((StatusCode::CREATED, Json(ticket)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draws::models::{PrizeTableEntry, RawDrawRef};
    use crate::error::MatchError;
    use crate::fetch::HttpFeedFetcher;
    use crate::reconciliation::SystemClock;
    use crate::store::InMemoryResultStore;

    fn state() -> (AppState, Arc<InMemoryResultStore>) {
        let store = Arc::new(InMemoryResultStore::new());
        let fetcher = Arc::new(HttpFeedFetcher::new("http://127.0.0.1:9/feed", 1).unwrap());
        let reconciler = Arc::new(WeeklyReconciler::new(store.clone(), fetcher, Arc::new(SystemClock), 22));
        let config = Config {
            database_url: "postgresql://localhost/reconciler".to_string(),
            bind_address: "127.0.0.1:0".to_string(),
            results_feed_url: "http://127.0.0.1:9/feed".to_string(),
            publication_hour: 22,
            schedule_hour: 23,
            schedule_enabled: false,
            fetch_timeout_secs: 1,
            auto_update: false,
        };
        (
            AppState {
                store: store.clone(),
                reconciler,
                config: Arc::new(config),
            },
            store,
        )
    }

    fn raw_ticket(numbers: &str) -> RawTicket {
        RawTicket {
            id: "EURO-0000042".to_string(),
            game: "euromillones".to_string(),
            numbers: numbers.to_string(),
            reseed: None,
            stars: Some("2,9".to_string()),
            key: None,
            draws: vec![RawDrawRef {
                draw: "2025/004".to_string(),
                date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            }],
        }
    }

    #[tokio::test]
    async fn test_register_ticket() {
        let (state, store) = state();

        let (status, Json(ticket)) = register_ticket(State(state), Json(raw_ticket("0314254050")))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(ticket.draws[0].draw_id.as_str(), "004");
        assert_eq!(store.ticket_count().await, 1);
    }

    #[tokio::test]
    async fn test_register_ticket_rejects_bad_numbers() {
        let (state, store) = state();

        let err = register_ticket(State(state), Json(raw_ticket("03,1x,25")))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Structural(MatchError::InvalidNumber(_))));
        assert_eq!(store.ticket_count().await, 0);
    }

    #[tokio::test]
    async fn test_prize_table_lookup() {
        let (state, store) = state();

        let missing = get_prize_table(
            State(state.clone()),
            Path(("gordo".to_string(), "7".to_string())),
            Query(PrizeTableQuery { year: Some(2025) }),
        )
        .await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));

        store
            .upsert_prize_entries(&[PrizeTableEntry::from_published(
                GameType::FiveKey,
                DrawId::from_number(7),
                NaiveDate::from_ymd_opt(2025, 2, 16).unwrap(),
                "R",
                "Reintegro",
                "1,50 €",
            )
            .unwrap()])
            .await
            .unwrap();

        let Json(found) = get_prize_table(
            State(state.clone()),
            Path(("five_key".to_string(), "2025/007".to_string())),
            Query(PrizeTableQuery { year: Some(2025) }),
        )
        .await
        .unwrap();
        assert_eq!(found.entries.len(), 1);
        assert_eq!(found.draw_id.as_str(), "007");

        // Draw 7 of another year has no table
        let other_year = get_prize_table(
            State(state),
            Path(("five_key".to_string(), "7".to_string())),
            Query(PrizeTableQuery { year: Some(2024) }),
        )
        .await;
        assert!(matches!(other_year, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_reconcile_week_without_updates() {
        let (state, _) = state();

        let Json(response) = reconcile_week(
            State(state),
            Path(NaiveDate::from_ymd_opt(2025, 1, 8).unwrap()),
            Query(ReconcileWeekQuery { auto_update: None }),
        )
        .await
        .unwrap();

        assert_eq!(response.report.monday, NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());
        assert!(response.report.pending.is_empty());
        assert!(response.summary.contains("TOTAL WON THIS WEEK: 0,00 €"));
    }
}
