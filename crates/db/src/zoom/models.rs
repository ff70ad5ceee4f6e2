use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One Zoom call, keyed by the source-side meeting UUID. Re-polls
/// overwrite in place; only `synced_at` moves on an unchanged meeting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meeting {
    pub source_uuid: String,
    pub account_name: String,
    pub host_email: Option<String>,
    pub topic: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_minutes: i32,
    pub participant_count: i32,
    pub synced_at: DateTime<Utc>,
}

/// Attendance row. Append-only: the same (meeting, email, join_time)
/// triple shows up again on every re-poll of an overlapping window and
/// is skipped, not rewritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub meeting_uuid: String,
    pub email: String,
    pub name: Option<String>,
    pub join_time: DateTime<Utc>,
    pub leave_time: Option<DateTime<Utc>>,
    pub duration_seconds: i32,
}
