use async_trait::async_trait;

use crate::ads::models::AdInsight;
use crate::WriteOutcome;
use campus_common::error::CampusResult;

#[async_trait]
pub trait AdsRepository: Send + Sync {
    /// Insert or overwrite a daily insight keyed (campaign, day).
    async fn upsert_insight(&self, insight: &AdInsight) -> CampusResult<WriteOutcome>;
}
