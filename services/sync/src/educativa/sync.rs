use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};

use campus_db::educativa::models::{Group, GroupProgress, GroupUnit, UnitProgress, UsageTime};
use campus_db::educativa::repositories::EducativaRepository;

use super::client::{EducativaClient, EducativaClientError};
use super::parse;
use crate::connector::{Connector, SyncOutcome};
use crate::pacing::{FixedInterval, BATCH_PAUSE, PAGE_DELAY, STUDENT_BATCH, STUDENT_DELAY};

const SOURCE_NAME: &str = "educativa";

/// Completed units over the grupo's mandatory total, as a percentage.
/// A grupo without mandatory units reports 0, not a division error.
fn progress_pct(completed: i64, mandatory_total: i64) -> f64 {
    if mandatory_total <= 0 {
        return 0.0;
    }
    (completed as f64 / mandatory_total as f64) * 100.0
}

/// Timestamps arrive as "2025-03-20 10:15:00" in platform-local time;
/// unparseable values degrade to None rather than failing the row.
fn parse_last_access(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").ok())
        .map(|dt| dt.and_utc())
}

pub struct EducativaSyncer<R> {
    client: EducativaClient,
    repo: R,
}

impl<R> EducativaSyncer<R>
where
    R: EducativaRepository,
{
    pub fn new(client: EducativaClient, repo: R) -> Self {
        Self { client, repo }
    }

    /// One grupo, in the fixed order units → progress → usage time →
    /// per-student unit progress. The order matters: the mandatory
    /// unit count from step one gates the percentage in step two.
    async fn sync_group(
        &self,
        group_id: i64,
        calls: &mut FixedInterval,
        outcome: &mut SyncOutcome,
    ) -> Result<(), EducativaClientError> {
        let group_param = [("id_grupo", group_id.to_string())];

        // 1. units
        calls.tick().await;
        let units_xml = self.client.call("obtener_unidades_grupo", &group_param).await?;
        let units = parse::parse_units(&units_xml);
        let mandatory_total = units.iter().filter(|u| u.mandatory).count() as i64;
        outcome.fetched += units.len() as u64;

        for raw in &units {
            let unit = GroupUnit {
                group_id,
                unit_id: raw.id,
                name: raw.name.clone(),
                mandatory: raw.mandatory,
                sort_order: raw.order as i32,
                synced_at: Utc::now(),
            };
            match self.repo.upsert_unit(&unit).await {
                Ok(write) => outcome.record_write(write),
                Err(e) => {
                    tracing::warn!(group = group_id, unit = raw.id, error = %e, "failed to upsert unit");
                    outcome.record_failure(format!("unit {}/{}: {e}", group_id, raw.id));
                }
            }
        }

        // 2. course progress
        calls.tick().await;
        let users_xml = self
            .client
            .call("consultar_usuarios_con_avances", &group_param)
            .await?;
        let users = parse::parse_user_progress(&users_xml);
        outcome.fetched += users.len() as u64;

        for raw in &users {
            let progress = GroupProgress {
                group_id,
                student_id: raw.student_id,
                student_name: (!raw.name.is_empty()).then(|| raw.name.clone()),
                email: (!raw.email.is_empty()).then(|| raw.email.clone()),
                completed_units: raw.completed_units as i32,
                progress_pct: progress_pct(raw.completed_units, mandatory_total),
                last_access: parse_last_access(raw.last_access.as_deref()),
                synced_at: Utc::now(),
            };
            match self.repo.upsert_progress(&progress).await {
                Ok(write) => outcome.record_write(write),
                Err(e) => {
                    tracing::warn!(group = group_id, student = raw.student_id, error = %e, "failed to upsert progress");
                    outcome.record_failure(format!("progress {}/{}: {e}", group_id, raw.student_id));
                }
            }
        }

        // 3. usage time
        calls.tick().await;
        let usage_xml = self
            .client
            .call("consultar_tiempo_estimado_uso_aula", &group_param)
            .await?;
        let usage_times = parse::parse_usage_times(&usage_xml);
        outcome.fetched += usage_times.len() as u64;

        for raw in &usage_times {
            let usage = UsageTime {
                group_id,
                student_id: raw.student_id,
                minutes: raw.minutes,
                synced_at: Utc::now(),
            };
            match self.repo.upsert_usage(&usage).await {
                Ok(write) => outcome.record_write(write),
                Err(e) => {
                    tracing::warn!(group = group_id, student = raw.student_id, error = %e, "failed to upsert usage time");
                    outcome.record_failure(format!("usage {}/{}: {e}", group_id, raw.student_id));
                }
            }
        }

        // 4. per-student unit progress, chunked to bound burst rate
        let mut students = FixedInterval::new(STUDENT_DELAY);
        let chunks = users.chunks(STUDENT_BATCH).count();
        for (index, chunk) in users.chunks(STUDENT_BATCH).enumerate() {
            for user in chunk {
                students.tick().await;
                self.sync_student_units(group_id, user.student_id, outcome)
                    .await;
            }
            if index + 1 < chunks {
                tokio::time::sleep(BATCH_PAUSE).await;
            }
        }

        Ok(())
    }

    /// One student's per-unit progress. Transport errors here skip the
    /// student and keep the grupo going; the known missing-user fault
    /// never even reaches this far (the client maps it to an empty
    /// payload).
    async fn sync_student_units(&self, group_id: i64, student_id: i64, outcome: &mut SyncOutcome) {
        let params = [
            ("id_grupo", group_id.to_string()),
            ("id_usuario", student_id.to_string()),
        ];

        let xml = match self.client.call("obtener_avance_usuario_unidad", &params).await {
            Ok(xml) => xml,
            Err(e) => {
                tracing::warn!(group = group_id, student = student_id, error = %e, "per-student progress skipped");
                outcome.skipped += 1;
                return;
            }
        };

        let advances = parse::parse_unit_progress(&xml);
        outcome.fetched += advances.len() as u64;

        for raw in &advances {
            let progress = UnitProgress {
                group_id,
                student_id,
                unit_id: raw.unit_id,
                status: raw.status.clone(),
                score: raw.score,
                synced_at: Utc::now(),
            };
            match self.repo.upsert_unit_progress(&progress).await {
                Ok(write) => outcome.record_write(write),
                Err(e) => {
                    tracing::warn!(
                        group = group_id,
                        student = student_id,
                        unit = raw.unit_id,
                        error = %e,
                        "failed to upsert unit progress"
                    );
                    outcome.record_failure(format!(
                        "unit progress {}/{}/{}: {e}",
                        group_id, student_id, raw.unit_id
                    ));
                }
            }
        }
    }
}

#[async_trait]
impl<R> Connector for EducativaSyncer<R>
where
    R: EducativaRepository,
{
    fn source_name(&self) -> &str {
        SOURCE_NAME
    }

    async fn sync(&self) -> SyncOutcome {
        let mut outcome = SyncOutcome::new(SOURCE_NAME);
        let mut calls = FixedInterval::new(PAGE_DELAY);

        calls.tick().await;
        let groups_xml = match self.client.call("consultar_grupos", &[]).await {
            Ok(xml) => xml,
            Err(e) => {
                tracing::error!(error = %e, "grupo listing failed");
                outcome.mark_fatal(e.to_string());
                return outcome;
            }
        };
        let groups = parse::parse_groups(&groups_xml);
        outcome.fetched += groups.len() as u64;
        tracing::info!(count = groups.len(), "fetched educativa grupos");

        for raw in &groups {
            tracing::info!(group = raw.id, name = %raw.name, "grupo sync starting");

            let group = Group {
                group_id: raw.id,
                name: raw.name.clone(),
                synced_at: Utc::now(),
            };
            match self.repo.upsert_group(&group).await {
                Ok(write) => outcome.record_write(write),
                Err(e) => {
                    tracing::warn!(group = raw.id, error = %e, "failed to upsert grupo");
                    outcome.record_failure(format!("grupo {}: {e}", raw.id));
                }
            }

            if let Err(e) = self.sync_group(raw.id, &mut calls, &mut outcome).await {
                tracing::error!(group = raw.id, error = %e, "grupo sync aborted");
                outcome.mark_fatal(format!("grupo {}: {e}", raw.id));
                break;
            }
        }

        outcome
    }
}
