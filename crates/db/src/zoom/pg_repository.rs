use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::zoom::models::{Meeting, Participant};
use crate::zoom::repositories::ZoomRepository;
use crate::WriteOutcome;
use campus_common::error::{CampusError, CampusResult};

#[derive(Clone)]
pub struct PgZoomRepository {
    pool: PgPool,
}

impl PgZoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ZoomRepository for PgZoomRepository {
    async fn upsert_meeting(&self, meeting: &Meeting) -> CampusResult<WriteOutcome> {
        // xmax = 0 only on freshly inserted rows; lets one round trip
        // report insert vs update.
        let row = sqlx::query(
            "insert into zoom_meetings
               (source_uuid, account_name, host_email, topic, start_time, end_time,
                duration_minutes, participant_count, synced_at)
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             on conflict (source_uuid) do update set
               account_name = excluded.account_name,
               host_email = excluded.host_email,
               topic = excluded.topic,
               start_time = excluded.start_time,
               end_time = excluded.end_time,
               duration_minutes = excluded.duration_minutes,
               participant_count = excluded.participant_count,
               synced_at = excluded.synced_at
             returning (xmax = 0) as inserted",
        )
        .bind(&meeting.source_uuid)
        .bind(&meeting.account_name)
        .bind(&meeting.host_email)
        .bind(&meeting.topic)
        .bind(meeting.start_time)
        .bind(meeting.end_time)
        .bind(meeting.duration_minutes)
        .bind(meeting.participant_count)
        .bind(meeting.synced_at)
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

    async fn insert_participant(&self, participant: &Participant) -> CampusResult<bool> {
        let result = sqlx::query(
            "insert into zoom_participants
               (meeting_uuid, email, name, join_time, leave_time, duration_seconds)
             values ($1, $2, $3, $4, $5, $6)
             on conflict (meeting_uuid, email, join_time) do nothing",
        )
        .bind(&participant.meeting_uuid)
        .bind(&participant.email)
        .bind(&participant.name)
        .bind(participant.join_time)
        .bind(participant.leave_time)
        .bind(participant.duration_seconds)
        .execute(&self.pool)
        .await
        .map_err(|e| CampusError::Database(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }
}
