use async_trait::async_trait;

use crate::educativa::models::{Group, GroupProgress, GroupUnit, UnitProgress, UsageTime};
use crate::WriteOutcome;
use campus_common::error::CampusResult;

/// Last-write-wins writes for everything the Educativa sync produces.
/// Every key derives purely from source data, so re-runs are idempotent.
#[async_trait]
pub trait EducativaRepository: Send + Sync {
    async fn upsert_group(&self, group: &Group) -> CampusResult<WriteOutcome>;

    async fn upsert_unit(&self, unit: &GroupUnit) -> CampusResult<WriteOutcome>;

    async fn upsert_progress(&self, progress: &GroupProgress) -> CampusResult<WriteOutcome>;

    async fn upsert_usage(&self, usage: &UsageTime) -> CampusResult<WriteOutcome>;

    async fn upsert_unit_progress(&self, progress: &UnitProgress) -> CampusResult<WriteOutcome>;
}
