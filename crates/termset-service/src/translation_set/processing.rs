//! Requests that hand a set to a processing job.

use serde::Serialize;

use termset_core::error::AppError;
use termset_entity::assignment::{BatchTranslateRequest, WorkAssignmentRequest};
use termset_entity::job::{JobMessage, JobType};
use termset_entity::translation_set::{SetProgress, TranslationSet, TranslationSetStatus};

use super::service::TranslationSetService;
use crate::context::RequestContext;

impl TranslationSetService {
    /// Queues a work assignment across the requested translators.
    pub async fn assign_work(
        &self,
        ctx: &RequestContext,
        codesystem: &str,
        refset: &str,
        label: &str,
        request: WorkAssignmentRequest,
    ) -> Result<TranslationSet, AppError> {
        request.validate()?;
        let set = self.find_set(codesystem, refset, label).await?;
        self.start_processing(ctx, set, JobType::AssignWork, &request)
            .await
    }

    /// Queues a batch of AI translation suggestions.
    pub async fn batch_ai_translate(
        &self,
        ctx: &RequestContext,
        codesystem: &str,
        refset: &str,
        label: &str,
        request: BatchTranslateRequest,
    ) -> Result<TranslationSet, AppError> {
        request.validate()?;
        let set = self.find_set(codesystem, refset, label).await?;
        self.start_processing(ctx, set, JobType::BatchAiTranslate, &request)
            .await
    }

    /// Re-runs creation for a set that failed or never finished initialising.
    ///
    /// Labelling is idempotent, so a partially labelled set converges.
    pub async fn refresh_set(
        &self,
        ctx: &RequestContext,
        codesystem: &str,
        refset: &str,
        label: &str,
    ) -> Result<TranslationSet, AppError> {
        let mut set = self.find_set(codesystem, refset, label).await?;
        if !matches!(
            set.status,
            TranslationSetStatus::Failed | TranslationSetStatus::Initialising
        ) {
            return Err(AppError::conflict(format!(
                "Translation set {} is {}; only FAILED or INITIALISING sets can be refreshed.",
                set.label, set.status
            )));
        }

        let mut next = set.progress();
        next.status = TranslationSetStatus::Initialising;
        next.percentage_processed = 0;
        next.error_message = None;
        let message = JobMessage::new(JobType::Create, &ctx.username, set.id);
        self.hand_to_worker(&mut set, next, message).await?;

        tracing::info!(
            "User {} refreshed translation set {}",
            ctx.username,
            set.composite_label()
        );
        Ok(set)
    }

    async fn start_processing<T: Serialize>(
        &self,
        ctx: &RequestContext,
        mut set: TranslationSet,
        job_type: JobType,
        request: &T,
    ) -> Result<TranslationSet, AppError> {
        if !set.status.accepts_new_job() {
            return Err(AppError::conflict(format!(
                "Translation set {} is {}; wait for it to be READY.",
                set.label, set.status
            )));
        }
        let message = JobMessage::new(job_type, &ctx.username, set.id).with_request(request)?;

        let mut next = set.progress();
        next.status = TranslationSetStatus::Processing;
        next.percentage_processed = self.config.percentage_processed_start;
        next.error_message = None;
        self.hand_to_worker(&mut set, next, message).await?;

        tracing::info!(
            "User {} queued {} for translation set {}",
            ctx.username,
            job_type,
            set.composite_label()
        );
        Ok(set)
    }

    /// Moves the set to `next` and queues `message`. If the job cannot be
    /// queued the previous progress is put back.
    async fn hand_to_worker(
        &self,
        set: &mut TranslationSet,
        next: SetProgress,
        message: JobMessage,
    ) -> Result<(), AppError> {
        let previous = set.progress();
        if !self.sets.update_progress(set.id, &next).await? {
            return Err(AppError::conflict(format!(
                "Translation set {} is being deleted.",
                set.label
            )));
        }
        if let Err(err) = self.queue.enqueue(message).await {
            tracing::error!("Failed to queue job for translation set {}: {}", set.id, err);
            if let Err(e) = self.sets.update_progress(set.id, &previous).await {
                tracing::error!("Failed to restore translation set {}: {}", set.id, e);
            }
            return Err(err);
        }
        set.apply_progress(&next);
        Ok(())
    }
}
