use async_trait::async_trait;
use sqlx::PgPool;

use crate::runlog::models::SyncRun;
use crate::runlog::repositories::SyncRunRepository;
use campus_common::error::{CampusError, CampusResult};

#[derive(Clone)]
pub struct PgSyncRunRepository {
    pool: PgPool,
}

impl PgSyncRunRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SyncRunRepository for PgSyncRunRepository {
    async fn record(&self, run: &SyncRun) -> CampusResult<()> {
        sqlx::query(
            "insert into sync_runs
               (id, source, fetched, inserted, updated, skipped, failed,
                status, error_summary, started_at, finished_at)
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(run.id)
        .bind(&run.source)
        .bind(run.fetched)
        .bind(run.inserted)
        .bind(run.updated)
        .bind(run.skipped)
        .bind(run.failed)
        .bind(&run.status)
        .bind(&run.error_summary)
        .bind(run.started_at)
        .bind(run.finished_at)
        .execute(&self.pool)
        .await
        .map_err(|e| CampusError::Database(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_pool;
    use chrono::Utc;
    use uuid::Uuid;

    async fn test_repo() -> Option<(PgSyncRunRepository, PgPool)> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;
        let pool = create_pool(&url).await.expect("db should connect");

        sqlx::query(
            "create table if not exists sync_runs (
               id uuid primary key,
               source text not null,
               fetched bigint not null default 0,
               inserted bigint not null default 0,
               updated bigint not null default 0,
               skipped bigint not null default 0,
               failed bigint not null default 0,
               status text not null,
               error_summary text,
               started_at timestamptz not null,
               finished_at timestamptz not null
             )",
        )
        .execute(&pool)
        .await
        .ok()?;

        Some((PgSyncRunRepository::new(pool.clone()), pool))
    }

    #[tokio::test]
    async fn record_appends_one_row() {
        let (repo, pool) = match test_repo().await {
            Some(r) => r,
            None => return,
        };
        let run = SyncRun {
            id: Uuid::new_v4(),
            source: "zoom".to_string(),
            fetched: 120,
            inserted: 100,
            updated: 15,
            skipped: 4,
            failed: 1,
            status: "ok".to_string(),
            error_summary: None,
            started_at: Utc::now(),
            finished_at: Utc::now(),
        };

        repo.record(&run).await.expect("record");

        let row: (String, i64) =
            sqlx::query_as("select status, fetched from sync_runs where id = $1")
                .bind(run.id)
                .fetch_one(&pool)
                .await
                .expect("row back");
        assert_eq!(row.0, "ok");
        assert_eq!(row.1, 120);
    }
}
