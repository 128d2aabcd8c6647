use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{sync::Arc, time::Duration};
use tracing::{error, info, warn};

use crate::{
    api::handler::AppState,
    config::Config,
    error::{AppError, AppResult},
    fetch::HttpFeedFetcher,
    reconciliation::{
        Clock, LogNotifier, ReconciliationScheduler, ScheduleConfig, SystemClock, WeeklyNotifier,
        WeeklyReconciler,
    },
    store::{PgResultStore, ResultStore},
};

pub async fn initialize_app_state(config: &Config) -> AppResult<AppState> {
    info!("Initializing application components ...");

    // Database pool
    let pool = initialize_database(&config.database_url).await?;
    let store: Arc<dyn ResultStore> = Arc::new(PgResultStore::new(pool));

    // An unreachable store is fatal at startup
    store.ping().await.map_err(|e| {
        error!("❌ Store {} unreachable: {}", store.name(), e);
        AppError::Config(format!("store {} unreachable: {}", store.name(), e))
    })?;
    info!("✅ Result store ready: {}", store.name());

    let fetcher = Arc::new(HttpFeedFetcher::new(
        &config.results_feed_url,
        config.fetch_timeout_secs,
    )?);
    info!("✅ Results feed configured: {}", config.results_feed_url);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let notifier: Arc<dyn WeeklyNotifier> = Arc::new(LogNotifier);
    let reconciler = Arc::new(
        WeeklyReconciler::new(store.clone(), fetcher, clock.clone(), config.publication_hour)
            .with_notifier(notifier),
    );
    info!(
        "✅ Weekly reconciler initialized (results expected after {}:00)",
        config.publication_hour
    );

    if config.schedule_enabled {
        let scheduler = ReconciliationScheduler::new(
            ScheduleConfig {
                execution_hour: config.schedule_hour,
                auto_update: config.auto_update,
            },
            reconciler.clone(),
            clock,
        );
        scheduler.start();
        info!("✅ Daily reconciliation scheduled at {}:00", config.schedule_hour);
    } else {
        warn!("⚠️  Daily reconciliation disabled (SCHEDULE_ENABLED=false)");
    }

    Ok(AppState {
        store,
        reconciler,
        config: Arc::new(config.clone()),
    })
}

async fn initialize_database(database_url: &str) -> AppResult<PgPool> {
    info!("📊 Connecting to database...");

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await?;

    info!("✓ Database pool configured: 20 max connections");

    // Run migrations
    info!("🔄 Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    info!("✓ Database initialized");
    Ok(pool)
}
