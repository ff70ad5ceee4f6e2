use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Internal cohort registry row: one course starting in one
/// month/year. The two mapping columns are each set at most once;
/// after that the cohort stops appearing as a reconciliation
/// candidate for that source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cohort {
    pub id: Uuid,
    pub course_code: String,
    pub course_name: String,
    pub year: i32,
    pub month: i32,
    pub zoom_topic: Option<String>,
    pub educativa_group_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
