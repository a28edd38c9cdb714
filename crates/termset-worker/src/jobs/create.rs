//! Set creation: label every unit matched by the set's query.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use termset_client::traits::ClientFactory;
use termset_core::error::AppError;
use termset_entity::PLATFORM_PROJECT;
use termset_entity::job::{Job, JobType};

use crate::executor::JobHandler;
use crate::progress::ProgressTracker;

/// `done / total` as a whole percentage. An empty result is complete.
pub fn percentage_done(done: u64, total: u64) -> i32 {
    if total == 0 {
        return 100;
    }
    (done.saturating_mul(100) / total).min(100) as i32
}

fn as_size(count: u64) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

/// Handles `CREATE` jobs.
#[derive(Debug)]
pub struct CreateSetHandler {
    clients: Arc<dyn ClientFactory>,
    batch_size: usize,
}

impl CreateSetHandler {
    /// Create a handler labelling `batch_size` units per bulk call.
    pub fn new(clients: Arc<dyn ClientFactory>, batch_size: usize) -> Self {
        Self {
            clients,
            batch_size: batch_size.max(1),
        }
    }

    async fn record(
        progress: &mut ProgressTracker,
        done: u64,
        total: Option<u64>,
    ) -> Result<(), AppError> {
        match total {
            Some(total) => {
                progress
                    .set_progress_and_size(percentage_done(done, total), as_size(total))
                    .await
            }
            // Size is known only once the server reports a total.
            None => Ok(()),
        }
    }
}

#[async_trait]
impl JobHandler for CreateSetHandler {
    fn job_type(&self) -> JobType {
        JobType::Create
    }

    async fn execute(&self, job: &Job, progress: &mut ProgressTracker) -> Result<(), AppError> {
        let set = progress.set().clone();
        let started = Instant::now();
        let terminology = self
            .clients
            .terminology(&job.acting_user, &set.selection_scope)?;
        let platform = self.clients.platform(&job.acting_user)?;

        let branch = terminology
            .branch_for_codesystem(&set.selection_scope)
            .await?;
        let mut ids = terminology
            .stream_matching_ids(&branch, &set.query_expression)
            .await?;

        let composite_label = set.composite_label();
        let label = platform
            .get_create_label(PLATFORM_PROJECT, &composite_label, &set.name)
            .await?;

        let mut batch: Vec<String> = Vec::with_capacity(self.batch_size);
        let mut done: u64 = 0;
        while let Some(id) = ids.next_id().await? {
            batch.push(id);
            if batch.len() == self.batch_size {
                tracing::info!("Adding label {} to batch of {} units", composite_label, batch.len());
                platform
                    .bulk_add_label(PLATFORM_PROJECT, label.id, &batch)
                    .await?;
                done += batch.len() as u64;
                batch.clear();
                tracing::info!(
                    "Completed batch for {}: {} units labelled in {:?}",
                    composite_label,
                    done,
                    started.elapsed()
                );
                Self::record(progress, done, ids.total()).await?;
            }
        }
        if !batch.is_empty() {
            platform
                .bulk_add_label(PLATFORM_PROJECT, label.id, &batch)
                .await?;
            done += batch.len() as u64;
        }

        let total = ids.total().unwrap_or(done);
        Self::record(progress, done, Some(total)).await?;
        progress.complete().await?;

        tracing::info!(
            "Translation set {} populated with {} units in {:?}",
            composite_label,
            done,
            started.elapsed()
        );
        Ok(())
    }
}
