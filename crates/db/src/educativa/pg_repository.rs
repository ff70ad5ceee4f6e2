use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::educativa::models::{Group, GroupProgress, GroupUnit, UnitProgress, UsageTime};
use crate::educativa::repositories::EducativaRepository;
use crate::WriteOutcome;
use campus_common::error::{CampusError, CampusResult};

#[derive(Clone)]
pub struct PgEducativaRepository {
    pool: PgPool,
}

impl PgEducativaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn outcome(row: sqlx::postgres::PgRow) -> WriteOutcome {
        let inserted: bool = row.get("inserted");
        if inserted {
            WriteOutcome::Inserted
        } else {
            WriteOutcome::Updated
        }
    }
}

#[async_trait]
impl EducativaRepository for PgEducativaRepository {
    async fn upsert_group(&self, group: &Group) -> CampusResult<WriteOutcome> {
        let row = sqlx::query(
            "insert into educativa_groups (group_id, name, synced_at)
             values ($1, $2, $3)
             on conflict (group_id) do update set
               name = excluded.name,
               synced_at = excluded.synced_at
             returning (xmax = 0) as inserted",
        )
        .bind(group.group_id)
        .bind(&group.name)
        .bind(group.synced_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| CampusError::Database(e.to_string()))?;

        Ok(Self::outcome(row))
    }

    async fn upsert_unit(&self, unit: &GroupUnit) -> CampusResult<WriteOutcome> {
        let row = sqlx::query(
            "insert into educativa_units (group_id, unit_id, name, mandatory, sort_order, synced_at)
             values ($1, $2, $3, $4, $5, $6)
             on conflict (group_id, unit_id) do update set
               name = excluded.name,
               mandatory = excluded.mandatory,
               sort_order = excluded.sort_order,
               synced_at = excluded.synced_at
             returning (xmax = 0) as inserted",
        )
        .bind(unit.group_id)
        .bind(unit.unit_id)
        .bind(&unit.name)
        .bind(unit.mandatory)
        .bind(unit.sort_order)
        .bind(unit.synced_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| CampusError::Database(e.to_string()))?;

        Ok(Self::outcome(row))
    }

    async fn upsert_progress(&self, progress: &GroupProgress) -> CampusResult<WriteOutcome> {
        let row = sqlx::query(
            "insert into educativa_progress
               (group_id, student_id, student_name, email, completed_units,
                progress_pct, last_access, synced_at)
             values ($1, $2, $3, $4, $5, $6, $7, $8)
             on conflict (group_id, student_id) do update set
               student_name = excluded.student_name,
               email = excluded.email,
               completed_units = excluded.completed_units,
               progress_pct = excluded.progress_pct,
               last_access = excluded.last_access,
               synced_at = excluded.synced_at
             returning (xmax = 0) as inserted",
        )
        .bind(progress.group_id)
        .bind(progress.student_id)
        .bind(&progress.student_name)
        .bind(&progress.email)
        .bind(progress.completed_units)
        .bind(progress.progress_pct)
        .bind(progress.last_access)
        .bind(progress.synced_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| CampusError::Database(e.to_string()))?;

        Ok(Self::outcome(row))
    }

    async fn upsert_usage(&self, usage: &UsageTime) -> CampusResult<WriteOutcome> {
        let row = sqlx::query(
            "insert into educativa_usage (group_id, student_id, minutes, synced_at)
             values ($1, $2, $3, $4)
             on conflict (group_id, student_id) do update set
               minutes = excluded.minutes,
               synced_at = excluded.synced_at
             returning (xmax = 0) as inserted",
        )
        .bind(usage.group_id)
        .bind(usage.student_id)
        .bind(usage.minutes)
        .bind(usage.synced_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| CampusError::Database(e.to_string()))?;

        Ok(Self::outcome(row))
    }

    async fn upsert_unit_progress(&self, progress: &UnitProgress) -> CampusResult<WriteOutcome> {
        let row = sqlx::query(
            "insert into educativa_unit_progress
               (group_id, student_id, unit_id, status, score, synced_at)
             values ($1, $2, $3, $4, $5, $6)
             on conflict (group_id, student_id, unit_id) do update set
               status = excluded.status,
               score = excluded.score,
               synced_at = excluded.synced_at
             returning (xmax = 0) as inserted",
        )
        .bind(progress.group_id)
        .bind(progress.student_id)
        .bind(progress.unit_id)
        .bind(&progress.status)
        .bind(progress.score)
        .bind(progress.synced_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| CampusError::Database(e.to_string()))?;

        Ok(Self::outcome(row))
    }
}
