mod ads;
mod connector;
mod educativa;
mod pacing;
mod reconcile;
mod zoom;

use chrono::{Datelike, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use campus_config::{init_tracing, AppConfig};
use campus_db::ads::pg_repository::PgAdsRepository;
use campus_db::cohort::pg_repository::PgCohortRepository;
use campus_db::educativa::pg_repository::PgEducativaRepository;
use campus_db::runlog::models::SyncRun;
use campus_db::runlog::pg_repository::PgSyncRunRepository;
use campus_db::runlog::repositories::SyncRunRepository;
use campus_db::zoom::pg_repository::PgZoomRepository;

use crate::ads::client::{AdsClient, AdsConfig};
use crate::ads::sync::AdsSyncer;
use crate::connector::{Connector, SyncOutcome};
use crate::educativa::client::{EducativaClient, EducativaConfig};
use crate::educativa::sync::EducativaSyncer;
use crate::zoom::client::{ZoomClient, ZoomConfig};
use crate::zoom::sync::ZoomSyncer;

/// Everything before this date predates the platforms being in use;
/// backfills never need to reach further back.
fn backfill_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).expect("valid backfill start")
}

#[derive(Parser)]
#[command(name = "campus-sync", about = "Pull external platform data into the campus store")]
struct Cli {
    #[command(subcommand)]
    job: Option<Job>,

    /// Window start (defaults to SYNC_WINDOW_DAYS ago)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Window end (defaults to today)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Walk every month since the fixed start date instead of the
    /// incremental window
    #[arg(long)]
    backfill: bool,
}

#[derive(Subcommand, Clone, Copy, Debug)]
enum Job {
    /// All sources in sequence, then the reconciliation pass
    All,
    Zoom,
    Educativa,
    Ads,
    Reconcile,
}

impl Job {
    fn name(self) -> &'static str {
        match self {
            Job::All => "all",
            Job::Zoom => "zoom",
            Job::Educativa => "educativa",
            Job::Ads => "ads",
            Job::Reconcile => "reconcile",
        }
    }
}

/// Month-by-month windows covering [start, end].
fn month_windows(start: NaiveDate, end: NaiveDate) -> Vec<(NaiveDate, NaiveDate)> {
    let mut windows = Vec::new();
    let mut cursor = start.with_day(1).expect("first of month");

    while cursor <= end {
        let next_month = if cursor.month() == 12 {
            NaiveDate::from_ymd_opt(cursor.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(cursor.year(), cursor.month() + 1, 1)
        }
        .expect("first of next month");

        let window_end = std::cmp::min(next_month.pred_opt().expect("end of month"), end);
        windows.push((std::cmp::max(cursor, start), window_end));
        cursor = next_month;
    }

    windows
}

/// Date windows for this invocation: one incremental window by
/// default, month windows since the fixed start when backfilling. The
/// report APIs cap a request at roughly one month, hence the split.
fn sync_windows(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    backfill: bool,
    window_days: u32,
    today: NaiveDate,
) -> Vec<(NaiveDate, NaiveDate)> {
    if backfill {
        return month_windows(backfill_start(), to.unwrap_or(today));
    }

    let to = to.unwrap_or(today);
    let from = from.unwrap_or_else(|| to - chrono::Duration::days(i64::from(window_days)));
    month_windows(from, to)
}

#[tokio::main]
async fn main() {
    init_tracing("info");
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let job = cli.job.unwrap_or(Job::All);

    tracing::info!(service = "campus-sync", job = job.name(), "starting");

    let config = AppConfig::from_env().expect("failed to load config");
    let pool = campus_db::create_pool(&config.database_url)
        .await
        .expect("failed to connect to database");

    let windows = sync_windows(
        cli.from,
        cli.to,
        cli.backfill,
        config.sync_window_days,
        Utc::now().date_naive(),
    );

    let started_at = Utc::now();
    let mut total = SyncOutcome::new(job.name());

    if matches!(job, Job::All | Job::Zoom) {
        run_zoom(&pool, &windows, &mut total).await;
    }
    if matches!(job, Job::All | Job::Educativa) {
        run_educativa(&pool, &mut total).await;
    }
    if matches!(job, Job::All | Job::Ads) {
        run_ads(&pool, &windows, &mut total).await;
    }
    if matches!(job, Job::All | Job::Reconcile) {
        run_reconcile(&pool, &mut total).await;
    }

    let run = SyncRun {
        id: Uuid::new_v4(),
        source: total.source.clone(),
        fetched: total.fetched as i64,
        inserted: total.inserted as i64,
        updated: total.updated as i64,
        skipped: total.skipped as i64,
        failed: total.failed as i64,
        status: total.status().to_string(),
        error_summary: total.error_summary(),
        started_at,
        finished_at: Utc::now(),
    };
    if let Err(e) = PgSyncRunRepository::new(pool.clone()).record(&run).await {
        tracing::error!(error = %e, "failed to write sync run log");
    }

    tracing::info!(
        fetched = total.fetched,
        inserted = total.inserted,
        updated = total.updated,
        skipped = total.skipped,
        failed = total.failed,
        status = total.status(),
        "run finished"
    );

    if total.fatal {
        std::process::exit(1);
    }
}

async fn run_zoom(
    pool: &campus_db::PgPool,
    windows: &[(NaiveDate, NaiveDate)],
    total: &mut SyncOutcome,
) {
    match ZoomConfig::from_env() {
        Ok(Some(zoom_config)) => {
            tracing::info!(
                accounts = zoom_config.accounts.len(),
                "zoom connector configured, starting sync"
            );

            let client = ZoomClient::new(zoom_config).expect("failed to create zoom client");
            let repo = PgZoomRepository::new(pool.clone());
            let syncer = ZoomSyncer::new(client, repo, windows.to_vec());

            let outcome = syncer.sync().await;
            tracing::info!(
                fetched = outcome.fetched,
                inserted = outcome.inserted,
                updated = outcome.updated,
                skipped = outcome.skipped,
                failed = outcome.failed,
                "zoom sync completed"
            );
            total.absorb(&outcome);
        }
        Ok(None) => {
            tracing::info!("no zoom credentials found, skipping zoom sync");
        }
        Err(e) => {
            panic!("zoom configuration error (fail-fast): {e}");
        }
    }
}

async fn run_educativa(pool: &campus_db::PgPool, total: &mut SyncOutcome) {
    if let Some(educativa_config) = EducativaConfig::from_env() {
        tracing::info!("educativa connector configured, starting sync");

        let client =
            EducativaClient::new(educativa_config).expect("failed to create educativa client");
        let repo = PgEducativaRepository::new(pool.clone());
        let syncer = EducativaSyncer::new(client, repo);

        let outcome = syncer.sync().await;
        tracing::info!(
            fetched = outcome.fetched,
            inserted = outcome.inserted,
            updated = outcome.updated,
            skipped = outcome.skipped,
            failed = outcome.failed,
            "educativa sync completed"
        );
        total.absorb(&outcome);
    } else {
        tracing::info!("no educativa credentials found, skipping educativa sync");
    }
}

async fn run_ads(
    pool: &campus_db::PgPool,
    windows: &[(NaiveDate, NaiveDate)],
    total: &mut SyncOutcome,
) {
    if let Some(ads_config) = AdsConfig::from_env() {
        tracing::info!("ads connector configured, starting sync");

        let client = AdsClient::new(ads_config).expect("failed to create ads client");
        let repo = PgAdsRepository::new(pool.clone());
        let syncer = AdsSyncer::new(client, repo, windows.to_vec());

        let outcome = syncer.sync().await;
        tracing::info!(
            fetched = outcome.fetched,
            inserted = outcome.inserted,
            updated = outcome.updated,
            failed = outcome.failed,
            "ads sync completed"
        );
        total.absorb(&outcome);
    } else {
        tracing::info!("no ads credentials found, skipping ads sync");
    }
}

async fn run_reconcile(pool: &campus_db::PgPool, total: &mut SyncOutcome) {
    tracing::info!("starting cohort reconciliation");
    let repo = PgCohortRepository::new(pool.clone());

    match reconcile::run_reconciliation(&repo).await {
        Ok(outcome) => {
            tracing::info!(
                mapped = outcome.mapped,
                ambiguous = outcome.ambiguous,
                undated = outcome.undated,
                no_candidates = outcome.no_candidates,
                "cohort reconciliation completed"
            );
            total.updated += outcome.mapped;
            total.skipped += outcome.ambiguous + outcome.undated + outcome.no_candidates;
        }
        Err(e) => {
            tracing::error!(error = %e, "cohort reconciliation failed");
            total.mark_fatal(format!("reconciliation: {e}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn default_window_is_the_last_n_days() {
        let today = date(2025, 3, 20);
        let windows = sync_windows(None, None, false, 30, today);
        assert_eq!(windows.first().unwrap().0, date(2025, 2, 18));
        assert_eq!(windows.last().unwrap().1, today);
    }

    #[test]
    fn explicit_window_is_respected() {
        let today = date(2025, 3, 20);
        let windows = sync_windows(Some(date(2025, 3, 1)), Some(date(2025, 3, 10)), false, 30, today);
        assert_eq!(windows, vec![(date(2025, 3, 1), date(2025, 3, 10))]);
    }

    #[test]
    fn windows_never_span_a_month_boundary() {
        let today = date(2025, 3, 20);
        let windows = sync_windows(Some(date(2025, 1, 15)), Some(date(2025, 3, 10)), false, 30, today);
        assert_eq!(
            windows,
            vec![
                (date(2025, 1, 15), date(2025, 1, 31)),
                (date(2025, 2, 1), date(2025, 2, 28)),
                (date(2025, 3, 1), date(2025, 3, 10)),
            ]
        );
    }

    #[test]
    fn backfill_walks_every_month_since_the_fixed_start() {
        let today = date(2023, 3, 15);
        let windows = sync_windows(None, None, true, 30, today);
        assert_eq!(
            windows,
            vec![
                (date(2023, 1, 1), date(2023, 1, 31)),
                (date(2023, 2, 1), date(2023, 2, 28)),
                (date(2023, 3, 1), date(2023, 3, 15)),
            ]
        );
    }

    #[test]
    fn december_rolls_into_the_next_year() {
        let windows = month_windows(date(2024, 12, 10), date(2025, 1, 5));
        assert_eq!(
            windows,
            vec![
                (date(2024, 12, 10), date(2024, 12, 31)),
                (date(2025, 1, 1), date(2025, 1, 5)),
            ]
        );
    }
}
