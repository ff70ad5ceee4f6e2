use async_trait::async_trait;
use uuid::Uuid;

use crate::cohort::models::Cohort;
use campus_common::error::CampusResult;

#[async_trait]
pub trait CohortRepository: Send + Sync {
    /// Distinct meeting topics with no cohort mapping yet.
    async fn unmapped_zoom_topics(&self) -> CampusResult<Vec<String>>;

    /// Educativa grupos (id, name) with no cohort mapping yet.
    async fn unmapped_educativa_groups(&self) -> CampusResult<Vec<(i64, String)>>;

    /// Cohorts in the given period still lacking a Zoom mapping.
    async fn zoom_candidates(&self, year: i32, month: i32) -> CampusResult<Vec<Cohort>>;

    /// Cohorts in the given period still lacking an Educativa mapping.
    async fn educativa_candidates(&self, year: i32, month: i32) -> CampusResult<Vec<Cohort>>;

    /// Write the Zoom topic onto a cohort, guarded so an already-mapped
    /// cohort is never overwritten. Returns `false` when the guard
    /// rejected the write.
    async fn assign_zoom_topic(&self, cohort_id: Uuid, topic: &str) -> CampusResult<bool>;

    /// Same guard for the Educativa grupo mapping.
    async fn assign_educativa_group(&self, cohort_id: Uuid, group_id: i64) -> CampusResult<bool>;
}
