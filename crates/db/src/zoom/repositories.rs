use async_trait::async_trait;

use crate::zoom::models::{Meeting, Participant};
use crate::WriteOutcome;
use campus_common::error::CampusResult;

#[async_trait]
pub trait ZoomRepository: Send + Sync {
    /// Insert or overwrite a meeting keyed by its source UUID.
    async fn upsert_meeting(&self, meeting: &Meeting) -> CampusResult<WriteOutcome>;

    /// Insert a participant row; returns `false` when the
    /// (meeting, email, join_time) triple already exists.
    async fn insert_participant(&self, participant: &Participant) -> CampusResult<bool>;
}
