//! Post-sync pass that maps newly observed external identifiers onto
//! internal cohorts. Runs after the connectors so freshly fetched
//! topics and grupos are visible; re-running is a no-op for anything
//! already mapped.

use campus_db::cohort::models::Cohort;
use campus_db::cohort::repositories::CohortRepository;
use campus_matching::{parse_dated_name, resolve, CohortCandidate, MatchingConfig, Resolution};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub mapped: u64,
    pub ambiguous: u64,
    pub undated: u64,
    pub no_candidates: u64,
    /// The guard rejected the write: someone mapped the cohort between
    /// candidate listing and assignment.
    pub lost_races: u64,
}

fn to_candidates(cohorts: &[Cohort]) -> Vec<CohortCandidate> {
    cohorts
        .iter()
        .map(|c| CohortCandidate {
            cohort_id: c.id,
            name: c.course_name.clone(),
        })
        .collect()
}

pub async fn run_reconciliation<R>(repo: &R) -> anyhow::Result<ReconcileOutcome>
where
    R: CohortRepository,
{
    let config = MatchingConfig::default();
    let mut outcome = ReconcileOutcome::default();

    // ── Zoom topics ─────────────────────────────────────────────
    for topic in repo.unmapped_zoom_topics().await? {
        let Some(dated) = parse_dated_name(&topic) else {
            tracing::debug!(topic = %topic, "topic without trailing period, skipping");
            outcome.undated += 1;
            continue;
        };

        let cohorts = repo.zoom_candidates(dated.year, dated.month as i32).await?;
        let decision = resolve(&config, &dated.base, &to_candidates(&cohorts));

        match decision.resolution {
            Resolution::Single { cohort_id } | Resolution::Scored { cohort_id, .. } => {
                if repo.assign_zoom_topic(cohort_id, &topic).await? {
                    tracing::info!(topic = %topic, cohort = %cohort_id, "zoom topic mapped");
                    outcome.mapped += 1;
                } else {
                    outcome.lost_races += 1;
                }
            }
            Resolution::Ambiguous => {
                tracing::warn!(
                    topic = %topic,
                    candidates = decision.trace.candidates.len(),
                    "ambiguous topic left unmapped for manual review"
                );
                outcome.ambiguous += 1;
            }
            Resolution::NoCandidates => {
                tracing::info!(topic = %topic, year = dated.year, month = dated.month, "no cohort candidates for topic");
                outcome.no_candidates += 1;
            }
        }
    }

    // ── Educativa grupos ────────────────────────────────────────
    for (group_id, name) in repo.unmapped_educativa_groups().await? {
        let Some(dated) = parse_dated_name(&name) else {
            tracing::debug!(group = group_id, name = %name, "grupo without trailing period, skipping");
            outcome.undated += 1;
            continue;
        };

        let cohorts = repo
            .educativa_candidates(dated.year, dated.month as i32)
            .await?;
        let decision = resolve(&config, &dated.base, &to_candidates(&cohorts));

        match decision.resolution {
            Resolution::Single { cohort_id } | Resolution::Scored { cohort_id, .. } => {
                if repo.assign_educativa_group(cohort_id, group_id).await? {
                    tracing::info!(group = group_id, cohort = %cohort_id, "educativa grupo mapped");
                    outcome.mapped += 1;
                } else {
                    outcome.lost_races += 1;
                }
            }
            Resolution::Ambiguous => {
                tracing::warn!(
                    group = group_id,
                    name = %name,
                    "ambiguous grupo left unmapped for manual review"
                );
                outcome.ambiguous += 1;
            }
            Resolution::NoCandidates => {
                tracing::info!(group = group_id, name = %name, "no cohort candidates for grupo");
                outcome.no_candidates += 1;
            }
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use campus_common::error::CampusResult;
    use chrono::Utc;
    use std::sync::Mutex;
    use uuid::Uuid;

    /// In-memory cohort registry mirroring the guard semantics of the
    /// Postgres implementation.
    #[derive(Default)]
    struct MemCohortRepo {
        cohorts: Mutex<Vec<Cohort>>,
        topics: Vec<String>,
        groups: Vec<(i64, String)>,
    }

    impl MemCohortRepo {
        fn with_cohorts(names: &[(&str, i32, i32)]) -> Self {
            let cohorts = names
                .iter()
                .map(|(name, year, month)| Cohort {
                    id: Uuid::new_v4(),
                    course_code: format!("C-{name}"),
                    course_name: name.to_string(),
                    year: *year,
                    month: *month,
                    zoom_topic: None,
                    educativa_group_id: None,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                })
                .collect();
            Self {
                cohorts: Mutex::new(cohorts),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl CohortRepository for MemCohortRepo {
        async fn unmapped_zoom_topics(&self) -> CampusResult<Vec<String>> {
            let cohorts = self.cohorts.lock().unwrap();
            Ok(self
                .topics
                .iter()
                .filter(|t| {
                    !cohorts
                        .iter()
                        .any(|c| c.zoom_topic.as_deref() == Some(t.as_str()))
                })
                .cloned()
                .collect())
        }

        async fn unmapped_educativa_groups(&self) -> CampusResult<Vec<(i64, String)>> {
            let cohorts = self.cohorts.lock().unwrap();
            Ok(self
                .groups
                .iter()
                .filter(|(id, _)| !cohorts.iter().any(|c| c.educativa_group_id == Some(*id)))
                .cloned()
                .collect())
        }

        async fn zoom_candidates(&self, year: i32, month: i32) -> CampusResult<Vec<Cohort>> {
            Ok(self
                .cohorts
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.year == year && c.month == month && c.zoom_topic.is_none())
                .cloned()
                .collect())
        }

        async fn educativa_candidates(&self, year: i32, month: i32) -> CampusResult<Vec<Cohort>> {
            Ok(self
                .cohorts
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.year == year && c.month == month && c.educativa_group_id.is_none())
                .cloned()
                .collect())
        }

        async fn assign_zoom_topic(&self, cohort_id: Uuid, topic: &str) -> CampusResult<bool> {
            let mut cohorts = self.cohorts.lock().unwrap();
            let cohort = cohorts
                .iter_mut()
                .find(|c| c.id == cohort_id && c.zoom_topic.is_none());
            match cohort {
                Some(c) => {
                    c.zoom_topic = Some(topic.to_string());
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn assign_educativa_group(&self, cohort_id: Uuid, group_id: i64) -> CampusResult<bool> {
            let mut cohorts = self.cohorts.lock().unwrap();
            let cohort = cohorts
                .iter_mut()
                .find(|c| c.id == cohort_id && c.educativa_group_id.is_none());
            match cohort {
                Some(c) => {
                    c.educativa_group_id = Some(group_id);
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    #[tokio::test]
    async fn maps_topic_onto_the_clear_winner() {
        let mut repo = MemCohortRepo::with_cohorts(&[
            ("Arteterapia y Creatividad", 2025, 3),
            ("Psicomotricidad Infantil", 2025, 3),
        ]);
        repo.topics = vec!["Curso de Arteterapia - Marzo 2025".to_string()];

        let outcome = run_reconciliation(&repo).await.unwrap();

        assert_eq!(outcome.mapped, 1);
        assert_eq!(outcome.ambiguous, 0);
        let cohorts = repo.cohorts.lock().unwrap();
        let mapped = cohorts
            .iter()
            .find(|c| c.course_name == "Arteterapia y Creatividad")
            .unwrap();
        assert_eq!(
            mapped.zoom_topic.as_deref(),
            Some("Curso de Arteterapia - Marzo 2025")
        );
    }

    #[tokio::test]
    async fn single_candidate_in_period_maps_directly() {
        let mut repo = MemCohortRepo::with_cohorts(&[
            ("Gestión Cultural", 2025, 5),
            ("Otra Cosa", 2025, 6),
        ]);
        // Zero token overlap with the only May cohort, still mapped
        repo.topics = vec!["Encuentro Sincrónico - Mayo 2025".to_string()];

        let outcome = run_reconciliation(&repo).await.unwrap();

        assert_eq!(outcome.mapped, 1);
        let cohorts = repo.cohorts.lock().unwrap();
        assert!(cohorts
            .iter()
            .find(|c| c.course_name == "Gestión Cultural")
            .unwrap()
            .zoom_topic
            .is_some());
    }

    #[tokio::test]
    async fn ambiguous_topic_stays_unmapped_and_verdict_is_stable() {
        let mut repo = MemCohortRepo::with_cohorts(&[
            ("Arteterapia Inicial", 2025, 3),
            ("Arteterapia Avanzada", 2025, 3),
        ]);
        repo.topics = vec!["Arteterapia - Marzo 2025".to_string()];

        let first = run_reconciliation(&repo).await.unwrap();
        assert_eq!(first.mapped, 0);
        assert_eq!(first.ambiguous, 1);

        // Same verdict on every re-run, never a random pick
        let second = run_reconciliation(&repo).await.unwrap();
        assert_eq!(second.ambiguous, 1);
        let cohorts = repo.cohorts.lock().unwrap();
        assert!(cohorts.iter().all(|c| c.zoom_topic.is_none()));
    }

    #[tokio::test]
    async fn undated_topic_is_skipped() {
        let mut repo = MemCohortRepo::with_cohorts(&[("Arteterapia", 2025, 3)]);
        repo.topics = vec!["Reunión de equipo".to_string()];

        let outcome = run_reconciliation(&repo).await.unwrap();

        assert_eq!(outcome.undated, 1);
        assert_eq!(outcome.mapped, 0);
    }

    #[tokio::test]
    async fn rerun_is_a_noop_for_mapped_entities() {
        let mut repo = MemCohortRepo::with_cohorts(&[
            ("Arteterapia y Creatividad", 2025, 3),
            ("Psicomotricidad Infantil", 2025, 3),
        ]);
        repo.topics = vec!["Curso de Arteterapia - Marzo 2025".to_string()];

        let first = run_reconciliation(&repo).await.unwrap();
        assert_eq!(first.mapped, 1);

        let second = run_reconciliation(&repo).await.unwrap();
        assert_eq!(second.mapped, 0, "already-mapped topic must not remap");
        assert_eq!(second.lost_races, 0);

        // Still exactly one cohort carrying the topic
        let cohorts = repo.cohorts.lock().unwrap();
        let carriers = cohorts.iter().filter(|c| c.zoom_topic.is_some()).count();
        assert_eq!(carriers, 1);
    }

    #[tokio::test]
    async fn no_candidates_in_period_is_reported_not_fatal() {
        let mut repo = MemCohortRepo::with_cohorts(&[("Arteterapia", 2024, 11)]);
        repo.topics = vec!["Arteterapia - Marzo 2025".to_string()];

        let outcome = run_reconciliation(&repo).await.unwrap();

        assert_eq!(outcome.no_candidates, 1);
        assert_eq!(outcome.mapped, 0);
    }

    #[tokio::test]
    async fn educativa_groups_map_like_topics() {
        let mut repo = MemCohortRepo::with_cohorts(&[
            ("Neuroeducación para Docentes", 2025, 7),
            ("Gestión Cultural", 2025, 7),
        ]);
        repo.groups = vec![(
            42,
            "Curso de Especialización en Neuroeducación - Julio 2025".to_string(),
        )];

        let outcome = run_reconciliation(&repo).await.unwrap();

        assert_eq!(outcome.mapped, 1);
        let cohorts = repo.cohorts.lock().unwrap();
        let mapped = cohorts
            .iter()
            .find(|c| c.course_name == "Neuroeducación para Docentes")
            .unwrap();
        assert_eq!(mapped.educativa_group_id, Some(42));
    }
}
