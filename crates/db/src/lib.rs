pub mod ads;
pub mod cohort;
pub mod educativa;
pub mod runlog;
pub mod zoom;

use campus_common::error::{CampusError, CampusResult};
use sqlx::postgres::PgPoolOptions;

pub use sqlx::PgPool;

/// Create a Postgres connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> CampusResult<PgPool> {
    tracing::info!("connecting to database");
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(|e| CampusError::Database(e.to_string()))
}

/// Whether an upsert-by-key landed as a fresh row or an overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Inserted,
    Updated,
}
