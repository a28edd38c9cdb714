//! Cron scheduler for periodic maintenance tasks.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use termset_core::config::WorkerConfig;
use termset_core::error::AppError;
use termset_core::result::AppResult;
use termset_database::traits::{JobStore, TranslationSetStore};
use termset_entity::translation_set::TranslationSetStatus;

/// Error recorded on jobs and sets reclaimed after running too long.
pub const STALE_JOB_MESSAGE: &str = "Processing timed out";

/// Cron-based scheduler for periodic background tasks.
pub struct CronScheduler {
    scheduler: JobScheduler,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler.
    pub async fn new() -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {}", e)))?;
        Ok(Self { scheduler })
    }

    /// Start the scheduler.
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {}", e)))?;
        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shut the scheduler down.
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {}", e)))?;
        tracing::info!("Cron scheduler shut down");
        Ok(())
    }

    /// Periodically fail jobs that have been running longer than the
    /// configured timeout.
    pub async fn register_stale_job_reclaim(
        &self,
        jobs: Arc<dyn JobStore>,
        sets: Arc<dyn TranslationSetStore>,
        config: &WorkerConfig,
    ) -> Result<(), AppError> {
        let timeout_minutes = config.stale_job_timeout_minutes;
        let job = CronJob::new_async(config.reclaim_schedule.as_str(), move |_uuid, _lock| {
            let jobs = Arc::clone(&jobs);
            let sets = Arc::clone(&sets);
            Box::pin(async move {
                match reclaim_stale_jobs(jobs.as_ref(), sets.as_ref(), timeout_minutes).await {
                    Ok(0) => tracing::debug!("No stale jobs found"),
                    Ok(count) => tracing::warn!("Reclaimed {} stale jobs", count),
                    Err(e) => tracing::error!("Stale job reclamation failed: {}", e),
                }
            })
        })
        .map_err(|e| {
            AppError::internal(format!("Failed to create stale_job_reclaim schedule: {}", e))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add stale_job_reclaim schedule: {}", e))
        })?;

        tracing::info!(
            "Registered: stale_job_reclaim ({}, timeout {}min)",
            config.reclaim_schedule,
            timeout_minutes
        );
        Ok(())
    }
}

/// Fail every job running for longer than `timeout_minutes`, and fail its
/// set if the set is still mid-processing. Returns the number reclaimed.
pub async fn reclaim_stale_jobs(
    jobs: &dyn JobStore,
    sets: &dyn TranslationSetStore,
    timeout_minutes: i64,
) -> AppResult<usize> {
    let cutoff = Utc::now() - Duration::minutes(timeout_minutes);
    let stale = jobs.find_stale(cutoff).await?;

    let mut reclaimed = 0;
    for job in &stale {
        tracing::warn!(
            "Reclaiming stale job {} (type='{}', set={}, worker={:?})",
            job.id,
            job.job_type,
            job.target_set_id,
            job.worker_id
        );
        if !jobs.mark_failed(job.id, STALE_JOB_MESSAGE).await? {
            // Finished between the scan and the update.
            continue;
        }
        reclaimed += 1;

        if let Some(set) = sets.find_by_id(job.target_set_id).await? {
            if matches!(
                set.status,
                TranslationSetStatus::Processing | TranslationSetStatus::Initialising
            ) {
                sets.update_progress(set.id, &set.progress().failed(STALE_JOB_MESSAGE))
                    .await?;
            }
        }
    }
    Ok(reclaimed)
}
