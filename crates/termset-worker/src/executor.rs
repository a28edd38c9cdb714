//! Job executor: owns the set lifecycle around each handler.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use termset_core::error::AppError;
use termset_database::traits::{JobStore, TranslationSetStore};
use termset_entity::job::{Job, JobType};

use crate::progress::ProgressTracker;

/// A processor for one job type.
#[async_trait]
pub trait JobHandler: Send + Sync + std::fmt::Debug {
    /// The job type this handler processes.
    fn job_type(&self) -> JobType;

    /// Whether the set enters `PROCESSING` before the handler runs.
    fn marks_processing(&self) -> bool {
        true
    }

    /// Run the job against the set held by `progress`.
    async fn execute(&self, job: &Job, progress: &mut ProgressTracker) -> Result<(), AppError>;
}

/// Error from job execution.
#[derive(Debug, thiserror::Error)]
pub enum JobExecutionError {
    /// Permanent failure; the job is not retried.
    #[error("Permanent job failure: {0}")]
    Permanent(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(#[from] AppError),
}

/// Dispatches jobs to the handler registered for their type.
#[derive(Debug)]
pub struct JobExecutor {
    handlers: HashMap<JobType, Arc<dyn JobHandler>>,
    sets: Arc<dyn TranslationSetStore>,
    jobs: Arc<dyn JobStore>,
}

impl JobExecutor {
    /// Create an executor persisting set progress through `sets`.
    ///
    /// Progress writes are checked against the job's row in `jobs`, so a job
    /// reclaimed as stale stops touching its set.
    pub fn new(sets: Arc<dyn TranslationSetStore>, jobs: Arc<dyn JobStore>) -> Self {
        Self {
            handlers: HashMap::new(),
            sets,
            jobs,
        }
    }

    /// Register a job handler.
    pub fn register(&mut self, handler: Arc<dyn JobHandler>) {
        let job_type = handler.job_type();
        tracing::info!("Registered job handler for type '{}'", job_type);
        self.handlers.insert(job_type, handler);
    }

    /// Execute a job.
    ///
    /// A handler error marks the set `FAILED` with the error message and is
    /// reported as a permanent failure.
    pub async fn execute(&self, job: &Job) -> Result<(), JobExecutionError> {
        let handler = self.handlers.get(&job.job_type).ok_or_else(|| {
            JobExecutionError::Permanent(format!(
                "No handler registered for job type '{}'",
                job.job_type
            ))
        })?;

        let Some(set) = self.sets.find_by_id(job.target_set_id).await? else {
            tracing::warn!(
                "Translation set {} for job {} no longer exists, skipping",
                job.target_set_id,
                job.id
            );
            return Ok(());
        };

        tracing::info!(
            "Executing job: id={}, type='{}', set='{}', user='{}'",
            job.id,
            job.job_type,
            set.label,
            job.acting_user
        );

        let mut progress = ProgressTracker::new(Arc::clone(&self.sets), set)
            .with_lease(Arc::clone(&self.jobs), job.id);
        if handler.marks_processing() {
            progress.start().await?;
        }

        match handler.execute(job, &mut progress).await {
            Ok(()) => Ok(()),
            Err(err) => {
                tracing::error!(
                    "Job {} failed for set '{}': {}",
                    job.id,
                    progress.set().label,
                    err
                );
                if let Err(e) = progress.fail(&err.message).await {
                    tracing::warn!("Failure not recorded on set {}: {}", job.target_set_id, e);
                }
                Err(JobExecutionError::Permanent(err.to_string()))
            }
        }
    }
}
