use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::cohort::models::Cohort;
use crate::cohort::repositories::CohortRepository;
use campus_common::error::{CampusError, CampusResult};

#[derive(Clone)]
pub struct PgCohortRepository {
    pool: PgPool,
}

impl PgCohortRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: sqlx::postgres::PgRow) -> Cohort {
        Cohort {
            id: row.get("id"),
            course_code: row.get("course_code"),
            course_name: row.get("course_name"),
            year: row.get("year"),
            month: row.get("month"),
            zoom_topic: row.get("zoom_topic"),
            educativa_group_id: row.get("educativa_group_id"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }

    async fn candidates(&self, year: i32, month: i32, mapping_col: &str) -> CampusResult<Vec<Cohort>> {
        let sql = format!(
            "select id, course_code, course_name, year, month, zoom_topic,
                    educativa_group_id, created_at, updated_at
             from cohorts
             where year = $1 and month = $2 and {mapping_col} is null
             order by course_code",
        );
        let rows = sqlx::query(&sql)
            .bind(year)
            .bind(month)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| CampusError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(Self::map_row).collect())
    }
}

#[async_trait]
impl CohortRepository for PgCohortRepository {
    async fn unmapped_zoom_topics(&self) -> CampusResult<Vec<String>> {
        let rows = sqlx::query(
            "select distinct topic from zoom_meetings
             where topic <> ''
               and topic not in (select zoom_topic from cohorts where zoom_topic is not null)
             order by topic",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CampusError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(|r| r.get("topic")).collect())
    }

    async fn unmapped_educativa_groups(&self) -> CampusResult<Vec<(i64, String)>> {
        let rows = sqlx::query(
            "select group_id, name from educativa_groups
             where group_id not in
               (select educativa_group_id from cohorts where educativa_group_id is not null)
             order by group_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CampusError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|r| (r.get("group_id"), r.get("name")))
            .collect())
    }

    async fn zoom_candidates(&self, year: i32, month: i32) -> CampusResult<Vec<Cohort>> {
        self.candidates(year, month, "zoom_topic").await
    }

    async fn educativa_candidates(&self, year: i32, month: i32) -> CampusResult<Vec<Cohort>> {
        self.candidates(year, month, "educativa_group_id").await
    }

    async fn assign_zoom_topic(&self, cohort_id: Uuid, topic: &str) -> CampusResult<bool> {
        let result = sqlx::query(
            "update cohorts
             set zoom_topic = $1, updated_at = $2
             where id = $3 and zoom_topic is null",
        )
        .bind(topic)
        .bind(Utc::now())
        .bind(cohort_id)
        .execute(&self.pool)
        .await
        .map_err(|e| CampusError::Database(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    async fn assign_educativa_group(&self, cohort_id: Uuid, group_id: i64) -> CampusResult<bool> {
        let result = sqlx::query(
            "update cohorts
             set educativa_group_id = $1, updated_at = $2
             where id = $3 and educativa_group_id is null",
        )
        .bind(group_id)
        .bind(Utc::now())
        .bind(cohort_id)
        .execute(&self.pool)
        .await
        .map_err(|e| CampusError::Database(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }
}
