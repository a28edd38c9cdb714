//! Worker runner: polls the job queue and executes claimed jobs.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, watch};
use tokio::time;

use termset_core::config::WorkerConfig;

use crate::executor::{JobExecutionError, JobExecutor};
use crate::queue::JobQueue;

/// Polls one queue and runs up to `concurrency` jobs at a time.
#[derive(Debug)]
pub struct WorkerRunner {
    queue: Arc<JobQueue>,
    executor: Arc<JobExecutor>,
    config: WorkerConfig,
    worker_id: String,
}

impl WorkerRunner {
    /// Create a new worker runner.
    pub fn new(
        queue: Arc<JobQueue>,
        executor: Arc<JobExecutor>,
        config: WorkerConfig,
        worker_id: String,
    ) -> Self {
        Self {
            queue,
            executor,
            config,
            worker_id,
        }
    }

    /// Run until the cancel signal is received, then wait for in-flight jobs.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        tracing::info!(
            "Worker '{}' started with concurrency={}, poll_interval={}s, queue='{}'",
            self.worker_id,
            self.config.concurrency,
            self.config.poll_interval_seconds,
            self.queue.name()
        );

        let slots = self.config.concurrency.max(1);
        let semaphore = Arc::new(Semaphore::new(slots));
        let poll_interval = Duration::from_secs(self.config.poll_interval_seconds);

        loop {
            tokio::select! {
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        tracing::info!("Worker '{}' received shutdown signal", self.worker_id);
                        break;
                    }
                }
                claimed = self.poll_and_execute(&semaphore) => {
                    // Keep draining while jobs are available.
                    if claimed {
                        continue;
                    }
                    tokio::select! {
                        _ = cancel.changed() => {
                            if *cancel.borrow() {
                                tracing::info!("Worker '{}' shutting down", self.worker_id);
                                break;
                            }
                        }
                        _ = time::sleep(poll_interval) => {}
                    }
                }
            }
        }

        tracing::info!(
            "Worker '{}' waiting for in-flight jobs to complete...",
            self.worker_id
        );
        let _ = time::timeout(
            Duration::from_secs(30),
            semaphore.acquire_many(slots as u32),
        )
        .await;
        tracing::info!("Worker '{}' shut down complete", self.worker_id);
    }

    /// Claim one job and spawn it. Returns whether a job was claimed.
    async fn poll_and_execute(&self, semaphore: &Arc<Semaphore>) -> bool {
        let Ok(permit) = Arc::clone(semaphore).try_acquire_owned() else {
            tracing::trace!("All worker slots occupied, waiting...");
            return false;
        };

        let job = match self.queue.dequeue(&self.worker_id).await {
            Ok(Some(job)) => job,
            Ok(None) => {
                tracing::trace!("No jobs available on '{}'", self.queue.name());
                return false;
            }
            Err(e) => {
                tracing::error!("Failed to dequeue job: {}", e);
                return false;
            }
        };

        let queue = Arc::clone(&self.queue);
        let executor = Arc::clone(&self.executor);
        tokio::spawn(async move {
            let _permit = permit;
            let job_id = job.id;
            tracing::info!(
                "Processing job: id={}, type='{}', set={}",
                job_id,
                job.job_type,
                job.target_set_id
            );

            let failure = match executor.execute(&job).await {
                Ok(()) => {
                    match queue.complete(job_id).await {
                        Ok(true) => tracing::info!("Job {} completed successfully", job_id),
                        Ok(false) => tracing::warn!(
                            "Job {} finished after it was reclaimed; result not recorded",
                            job_id
                        ),
                        Err(e) => {
                            tracing::error!("Failed to mark job {} as completed: {}", job_id, e)
                        }
                    }
                    None
                }
                Err(JobExecutionError::Permanent(msg)) => {
                    tracing::error!("Job {} failed permanently: {}", job_id, msg);
                    Some(msg)
                }
                Err(JobExecutionError::Internal(err)) => {
                    let msg = err.to_string();
                    tracing::error!("Job {} internal error: {}", job_id, msg);
                    Some(msg)
                }
            };

            if let Some(msg) = failure {
                match queue.fail(job_id, &msg).await {
                    Ok(true) => {}
                    Ok(false) => tracing::warn!("Job {} was already reclaimed", job_id),
                    Err(e) => tracing::error!("Failed to mark job {} as failed: {}", job_id, e),
                }
            }
        });
        true
    }
}
