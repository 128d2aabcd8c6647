use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    /// Base URL of the JSON results feed used to backfill missing draws
    pub results_feed_url: String,
    /// Local hour (0-23) after which a draw's results are expected to be published
    pub publication_hour: u32,
    /// Local hour (0-23) of the daily reconciliation run
    pub schedule_hour: u32,
    pub schedule_enabled: bool,
    pub fetch_timeout_secs: u64,
    /// Fetch missing draws before evaluating tickets
    pub auto_update: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .set_default("database_url", "postgresql://localhost/reconciler")?
            .set_default("bind_address", "0.0.0.0:8080")?
            .set_default("results_feed_url", "http://localhost:9090/feed")?
            .set_default("publication_hour", 22_i64)?
            .set_default("schedule_hour", 23_i64)?
            .set_default("schedule_enabled", true)?
            .set_default("fetch_timeout_secs", 30_i64)?
            .set_default("auto_update", true)?
            .add_source(config::Environment::default().try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.publication_hour > 23 {
            return Err(format!("PUBLICATION_HOUR out of range: {}", self.publication_hour));
        }
        if self.schedule_hour > 23 {
            return Err(format!("SCHEDULE_HOUR out of range: {}", self.schedule_hour));
        }
        if self.database_url.trim().is_empty() {
            return Err("DATABASE_URL must not be empty".to_string());
        }
        Ok(())
    }
}
