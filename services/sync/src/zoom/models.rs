//! Serde mirrors of the Zoom report API payloads. These live only
//! between fetch and normalization; nothing here is persisted.

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
pub struct MeetingsPage {
    #[serde(default)]
    pub next_page_token: String,
    #[serde(default)]
    pub meetings: Vec<RawMeeting>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMeeting {
    pub uuid: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// Minutes.
    #[serde(default)]
    pub duration: i32,
    #[serde(default)]
    pub participants_count: i32,
}

#[derive(Debug, Deserialize)]
pub struct ParticipantsPage {
    #[serde(default)]
    pub next_page_token: String,
    #[serde(default)]
    pub participants: Vec<RawParticipant>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawParticipant {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub user_email: String,
    #[serde(default)]
    pub join_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub leave_time: Option<DateTime<Utc>>,
    /// Seconds.
    #[serde(default)]
    pub duration: i32,
}
