//! Set removal: drop the platform label, then the record.

use std::sync::Arc;

use async_trait::async_trait;

use termset_client::traits::ClientFactory;
use termset_core::error::AppError;
use termset_entity::PLATFORM_PROJECT;
use termset_entity::job::{Job, JobType};

use crate::executor::JobHandler;
use crate::progress::ProgressTracker;

/// Handles `DELETE` jobs.
#[derive(Debug)]
pub struct DeleteSetHandler {
    clients: Arc<dyn ClientFactory>,
}

impl DeleteSetHandler {
    /// Create a delete handler.
    pub fn new(clients: Arc<dyn ClientFactory>) -> Self {
        Self { clients }
    }
}

#[async_trait]
impl JobHandler for DeleteSetHandler {
    fn job_type(&self) -> JobType {
        JobType::Delete
    }

    // The set stays DELETING until it disappears.
    fn marks_processing(&self) -> bool {
        false
    }

    async fn execute(&self, job: &Job, progress: &mut ProgressTracker) -> Result<(), AppError> {
        let composite_label = progress.set().composite_label();
        let platform = self.clients.platform(&job.acting_user)?;
        platform
            .delete_label(PLATFORM_PROJECT, &composite_label)
            .await?;
        progress.remove().await?;
        tracing::info!("Deleted translation set {}", composite_label);
        Ok(())
    }
}
