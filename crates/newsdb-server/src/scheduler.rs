//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! recurring feed ingestion job.

use std::sync::Arc;

use newsdb_ingest::{IngestionRunner, TracingSink};
use sqlx::PgPool;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the background job scheduler.
///
/// The ingestion job is only registered when `config.ingest_cron` is set.
/// The returned handle must be kept alive; dropping it stops all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the cron expression is invalid, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    config: Arc<newsdb_core::AppConfig>,
    runner: Arc<IngestionRunner>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    match config.ingest_cron.clone() {
        Some(cron) => register_ingest_job(&scheduler, &cron, pool, config, runner).await?,
        None => tracing::info!("scheduler: ingestion job disabled"),
    }

    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_ingest_job(
    scheduler: &JobScheduler,
    cron: &str,
    pool: PgPool,
    config: Arc<newsdb_core::AppConfig>,
    runner: Arc<IngestionRunner>,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);
    // Held for the duration of a run; a tick that finds it locked is skipped.
    let running = Arc::new(Mutex::new(()));

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let config = Arc::clone(&config);
        let runner = Arc::clone(&runner);
        let running = Arc::clone(&running);

        Box::pin(async move {
            let Ok(_guard) = running.try_lock() else {
                tracing::warn!("scheduler: previous ingestion run still in progress; skipping tick");
                return;
            };
            tracing::info!("scheduler: starting ingestion run");
            run_ingest_job(&pool, &config, &runner).await;
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron, "scheduler: registered ingestion job");
    Ok(())
}

/// One scheduled ingestion. The feeds file is re-read every time so edits
/// take effect without a restart. Failures are logged, never propagated.
async fn run_ingest_job(pool: &PgPool, config: &newsdb_core::AppConfig, runner: &IngestionRunner) {
    let feeds = match newsdb_core::load_feeds(&config.feeds_path) {
        Ok(f) => f,
        Err(e) => {
            tracing::error!(
                path = %config.feeds_path.display(),
                error = %e,
                "scheduler: failed to load feeds file"
            );
            return;
        }
    };

    match runner.run(&feeds.feeds, pool, &TracingSink).await {
        Ok(report) => tracing::info!(
            attempted = report.attempted,
            inserted = report.inserted,
            duplicates = report.duplicates,
            failed = report.failed,
            "scheduler: ingestion run complete"
        ),
        Err(e) => tracing::error!(error = %e, "scheduler: ingestion run aborted"),
    }
}
