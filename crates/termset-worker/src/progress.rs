//! Persisted progress of the set a job is processing.

use std::sync::Arc;

use uuid::Uuid;

use termset_core::error::AppError;
use termset_core::result::AppResult;
use termset_database::traits::{JobStore, TranslationSetStore};
use termset_entity::job::JobStatus;
use termset_entity::translation_set::{SetProgress, TranslationSet, TranslationSetStatus};

/// Writes status and `percentageProcessed` for one set during one job.
///
/// Only the job-owned columns are written, so AI field edits made while the
/// job runs survive. Within a run the percentage never moves backwards,
/// except for the reset to 0 in [`ProgressTracker::start`].
#[derive(Debug)]
pub struct ProgressTracker {
    store: Arc<dyn TranslationSetStore>,
    set: TranslationSet,
    lease: Option<JobLease>,
}

/// The job whose set lease guards the writes.
#[derive(Debug)]
struct JobLease {
    jobs: Arc<dyn JobStore>,
    job_id: Uuid,
}

impl ProgressTracker {
    /// Track `set`, persisting through `store`.
    pub fn new(store: Arc<dyn TranslationSetStore>, set: TranslationSet) -> Self {
        Self {
            store,
            set,
            lease: None,
        }
    }

    /// Refuse every write once `job_id` is no longer running.
    pub fn with_lease(mut self, jobs: Arc<dyn JobStore>, job_id: Uuid) -> Self {
        self.lease = Some(JobLease { jobs, job_id });
        self
    }

    /// The set as last persisted.
    pub fn set(&self) -> &TranslationSet {
        &self.set
    }

    /// Enter `PROCESSING` at 0% and clear any previous failure.
    pub async fn start(&mut self) -> AppResult<()> {
        let mut next = self.set.progress();
        next.status = TranslationSetStatus::Processing;
        next.percentage_processed = 0;
        next.error_message = None;
        self.write(next).await
    }

    /// Record progress, clamped to `[0, 100]` and never below the last value.
    pub async fn set_progress(&mut self, percentage: i32) -> AppResult<()> {
        let size = self.set.size;
        self.set_progress_and_size(percentage, size).await
    }

    /// Record the set size together with progress.
    pub async fn set_progress_and_size(&mut self, percentage: i32, size: i32) -> AppResult<()> {
        let mut next = self.set.progress();
        next.status = TranslationSetStatus::Processing;
        next.percentage_processed = percentage.clamp(0, 100).max(self.set.percentage_processed);
        next.size = size;
        self.write(next).await
    }

    /// Finish the run: 100% and `READY`.
    pub async fn complete(&mut self) -> AppResult<()> {
        self.complete_as(TranslationSetStatus::Ready).await
    }

    /// Finish the run with a specific rest state.
    pub async fn complete_as(&mut self, status: TranslationSetStatus) -> AppResult<()> {
        let mut next = self.set.progress();
        next.status = status;
        next.percentage_processed = 100;
        self.write(next).await
    }

    /// Record a failure for the user to see.
    pub async fn fail(&mut self, message: &str) -> AppResult<()> {
        let next = self.set.progress().failed(message);
        self.write(next).await
    }

    /// Remove the set record.
    pub async fn remove(&mut self) -> AppResult<()> {
        self.check_lease().await?;
        self.store.delete(self.set.id).await
    }

    async fn write(&mut self, next: SetProgress) -> AppResult<()> {
        self.check_lease().await?;
        if !self.store.update_progress(self.set.id, &next).await? {
            return Err(AppError::conflict(format!(
                "Translation set {} was deleted or is being deleted",
                self.set.label
            )));
        }
        self.set.apply_progress(&next);
        Ok(())
    }

    async fn check_lease(&self) -> AppResult<()> {
        let Some(lease) = &self.lease else {
            return Ok(());
        };
        let running = lease
            .jobs
            .find_by_id(lease.job_id)
            .await?
            .is_some_and(|job| job.status == JobStatus::Running);
        if running {
            Ok(())
        } else {
            Err(AppError::conflict(format!(
                "Job {} no longer holds translation set {}",
                lease.job_id, self.set.label
            )))
        }
    }
}
