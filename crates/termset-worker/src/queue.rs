//! Job queue for enqueuing and claiming translation set jobs.

use std::sync::Arc;

use uuid::Uuid;

use termset_core::error::AppError;
use termset_database::traits::JobStore;
use termset_entity::job::{CreateJob, Job, JobMessage};

/// At-least-once queue backed by a [`JobStore`].
#[derive(Debug, Clone)]
pub struct JobQueue {
    store: Arc<dyn JobStore>,
    queue_name: String,
}

impl JobQueue {
    /// Create a queue named `queue_name`.
    pub fn new(store: Arc<dyn JobStore>, queue_name: impl Into<String>) -> Self {
        Self {
            store,
            queue_name: queue_name.into(),
        }
    }

    /// Name of the queue.
    pub fn name(&self) -> &str {
        &self.queue_name
    }

    /// Enqueue a job message.
    pub async fn enqueue(&self, message: JobMessage) -> Result<Job, AppError> {
        let job = self
            .store
            .create(&CreateJob {
                queue: self.queue_name.clone(),
                message,
            })
            .await?;

        tracing::info!(
            "Enqueued job: id={}, type='{}', set={}, user='{}'",
            job.id,
            job.job_type,
            job.target_set_id,
            job.acting_user
        );
        Ok(job)
    }

    /// Claim the next job whose set is not already being processed.
    pub async fn dequeue(&self, worker_id: &str) -> Result<Option<Job>, AppError> {
        let job = self.store.claim_next(&self.queue_name, worker_id).await?;
        if let Some(job) = &job {
            tracing::debug!(
                "Dequeued job: id={}, type='{}', set={}",
                job.id,
                job.job_type,
                job.target_set_id
            );
        }
        Ok(job)
    }

    /// Mark a job as completed successfully.
    ///
    /// Returns `false` when the job had already been finished elsewhere.
    pub async fn complete(&self, job_id: Uuid) -> Result<bool, AppError> {
        let finished = self.store.mark_completed(job_id).await?;
        tracing::debug!("Job completed: id={}, recorded={}", job_id, finished);
        Ok(finished)
    }

    /// Mark a job as failed. Returns `false` when the job had already been
    /// finished elsewhere.
    pub async fn fail(&self, job_id: Uuid, error: &str) -> Result<bool, AppError> {
        let finished = self.store.mark_failed(job_id, error).await?;
        tracing::debug!("Job failed: id={}, error='{}', recorded={}", job_id, error, finished);
        Ok(finished)
    }
}
