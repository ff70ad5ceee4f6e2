use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::ads::models::AdInsight;
use crate::ads::repositories::AdsRepository;
use crate::WriteOutcome;
use campus_common::error::{CampusError, CampusResult};

#[derive(Clone)]
pub struct PgAdsRepository {
    pool: PgPool,
}

impl PgAdsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdsRepository for PgAdsRepository {
    async fn upsert_insight(&self, insight: &AdInsight) -> CampusResult<WriteOutcome> {
        let row = sqlx::query(
            "insert into ad_insights
               (campaign_id, campaign_name, day, spend, impressions, clicks, synced_at)
             values ($1, $2, $3, $4, $5, $6, $7)
             on conflict (campaign_id, day) do update set
               campaign_name = excluded.campaign_name,
               spend = excluded.spend,
               impressions = excluded.impressions,
               clicks = excluded.clicks,
               synced_at = excluded.synced_at
             returning (xmax = 0) as inserted",
        )
        .bind(&insight.campaign_id)
        .bind(&insight.campaign_name)
        .bind(insight.day)
        .bind(insight.spend)
        .bind(insight.impressions)
        .bind(insight.clicks)
        .bind(insight.synced_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| CampusError::Database(e.to_string()))?;

        let inserted: bool = row.get("inserted");
        Ok(if inserted {
            WriteOutcome::Inserted
        } else {
            WriteOutcome::Updated
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_pool;
    use chrono::Utc;

    async fn test_repo() -> Option<PgAdsRepository> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;
        let pool = create_pool(&url).await.expect("db should connect");

        sqlx::query(
            "create table if not exists ad_insights (
               campaign_id text not null,
               campaign_name text not null default '',
               day date not null,
               spend double precision not null default 0,
               impressions bigint not null default 0,
               clicks bigint not null default 0,
               synced_at timestamptz not null,
               primary key (campaign_id, day)
             )",
        )
        .execute(&pool)
        .await
        .ok()?;

        Some(PgAdsRepository::new(pool))
    }

    #[tokio::test]
    async fn upsert_insight_is_idempotent() {
        let repo = match test_repo().await {
            Some(r) => r,
            None => return,
        };
        let insight = AdInsight {
            campaign_id: format!("camp-{}", uuid::Uuid::new_v4()),
            campaign_name: "Arteterapia Marzo".to_string(),
            day: chrono::NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            spend: 12.5,
            impressions: 1000,
            clicks: 40,
            synced_at: Utc::now(),
        };

        assert_eq!(
            repo.upsert_insight(&insight).await.expect("first"),
            WriteOutcome::Inserted
        );
        assert_eq!(
            repo.upsert_insight(&insight).await.expect("second"),
            WriteOutcome::Updated
        );
    }
}
