use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One Educativa grupo as listed by the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub group_id: i64,
    pub name: String,
    pub synced_at: DateTime<Utc>,
}

/// Course unit within a grupo, keyed (group, unit).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupUnit {
    pub group_id: i64,
    pub unit_id: i64,
    pub name: String,
    pub mandatory: bool,
    pub sort_order: i32,
    pub synced_at: DateTime<Utc>,
}

/// Per-student course progress, keyed (group, student).
/// `progress_pct` is completed units over the grupo's mandatory units;
/// values strictly overwrite on re-poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupProgress {
    pub group_id: i64,
    pub student_id: i64,
    pub student_name: Option<String>,
    pub email: Option<String>,
    pub completed_units: i32,
    pub progress_pct: f64,
    pub last_access: Option<DateTime<Utc>>,
    pub synced_at: DateTime<Utc>,
}

/// Estimated classroom usage time, keyed (group, student).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageTime {
    pub group_id: i64,
    pub student_id: i64,
    pub minutes: i64,
    pub synced_at: DateTime<Utc>,
}

/// Per-unit progress for one student, keyed (group, student, unit).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitProgress {
    pub group_id: i64,
    pub student_id: i64,
    pub unit_id: i64,
    pub status: String,
    pub score: f64,
    pub synced_at: DateTime<Utc>,
}
