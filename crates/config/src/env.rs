use campus_common::error::{CampusError, CampusResult};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub log_level: String,
    pub sync_window_days: u32,
}

impl AppConfig {
    /// Load configuration from environment variables.
    /// Loads `.env` file if present, then reads required vars.
    pub fn from_env() -> CampusResult<Self> {
        // Best-effort .env load; ignore if missing
        let _ = dotenvy::dotenv();

        Ok(Self {
            database_url: get_var("DATABASE_URL")?,
            log_level: get_var_or("LOG_LEVEL", "info"),
            sync_window_days: get_var_or("SYNC_WINDOW_DAYS", "30")
                .parse()
                .map_err(|e| CampusError::Config(format!("invalid SYNC_WINDOW_DAYS: {e}")))?,
        })
    }
}

fn get_var(key: &str) -> CampusResult<String> {
    env::var(key).map_err(|_| CampusError::Config(format!("{key} is required but not set")))
}

fn get_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}
