use async_trait::async_trait;

use crate::runlog::models::SyncRun;
use campus_common::error::CampusResult;

#[async_trait]
pub trait SyncRunRepository: Send + Sync {
    /// Append one audit row. There is deliberately no update method.
    async fn record(&self, run: &SyncRun) -> CampusResult<()>;
}
