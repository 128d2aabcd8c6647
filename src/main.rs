mod api;
mod bootstrap;
mod config;
mod draws;
mod error;
mod fetch;
mod matching;
mod prizes;
mod reconciliation;
mod server;
mod store;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

// Initialize logging and tracing
fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug,reconciler=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    info!("🚀 Starting Draw Reconciliation Service");

    // Load configuration
    let config = Config::from_env().context("failed to load configuration")?;
    config.validate().map_err(anyhow::Error::msg)?;

    let state = bootstrap::initialize_app_state(&config)
        .await
        .context("failed to initialize application state")?;

    // Create HTTP server
    let app = server::create_app(state).await;

    // Run the Server
    server::run_server(app, &config.bind_address).await?;

    Ok(())
}
