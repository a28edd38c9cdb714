//! Translation set lifecycle: create, list, read, update and delete.

use std::sync::Arc;

use termset_client::traits::ClientFactory;
use termset_core::config::ProcessingConfig;
use termset_core::error::AppError;
use termset_database::traits::TranslationSetStore;
use termset_entity::job::{JobMessage, JobType};
use termset_entity::translation_set::{
    CreateTranslationSet, TranslationSet, TranslationSetStatus, UpdateTranslationSet,
};
use termset_entity::{PLATFORM_COMPONENT, PLATFORM_PROJECT};
use termset_worker::queue::JobQueue;

use crate::context::RequestContext;

/// Orchestrates translation set requests.
#[derive(Debug, Clone)]
pub struct TranslationSetService {
    /// Translation set store.
    pub(crate) sets: Arc<dyn TranslationSetStore>,
    /// Per-request collaborator clients.
    pub(crate) clients: Arc<dyn ClientFactory>,
    /// Queue processing jobs are sent to.
    pub(crate) queue: Arc<JobQueue>,
    /// Processing tunables.
    pub(crate) config: ProcessingConfig,
}

impl TranslationSetService {
    /// Creates a new translation set service.
    pub fn new(
        sets: Arc<dyn TranslationSetStore>,
        clients: Arc<dyn ClientFactory>,
        queue: Arc<JobQueue>,
        config: ProcessingConfig,
    ) -> Self {
        Self {
            sets,
            clients,
            queue,
            config,
        }
    }

    /// Validates a new set, persists it as `INITIALISING` and queues the
    /// creation job.
    pub async fn create_set(
        &self,
        ctx: &RequestContext,
        data: CreateTranslationSet,
    ) -> Result<TranslationSet, AppError> {
        AppError::require("codesystem", Some(data.codesystem.as_str()))?;
        AppError::require("name", Some(data.name.as_str()))?;
        AppError::require("refset", Some(data.refset.as_str()))?;
        AppError::require("label", Some(data.label.as_str()))?;
        AppError::require("ecl", Some(data.query_expression.as_str()))?;
        AppError::require("selectionScope", Some(data.selection_scope.as_str()))?;

        if self
            .sets
            .find_by_identity(&data.codesystem, &data.label, &data.refset)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(
                "A translation set with this label already exists.",
            ));
        }

        let terminology = self.clients.terminology(&ctx.username, &data.codesystem)?;
        let languages = terminology.translation_languages(&data.codesystem).await?;
        let language_code = languages.get(&data.refset).cloned().ok_or_else(|| {
            AppError::not_found(format!("Language code not found for refset: {}", data.refset))
        })?;

        let set = TranslationSet::new(data, language_code, 0);

        let platform = self.clients.platform(&ctx.username)?;
        if !platform
            .translation_exists(&set.language_code_with_refset())
            .await?
        {
            return Err(AppError::conflict(
                "Translation does not exist in Translation Tool, please start language \
                 initialisation job or wait for it to finish.",
            ));
        }

        let set = self.sets.create(&set).await?;
        if let Err(err) = self
            .queue
            .enqueue(JobMessage::new(JobType::Create, &ctx.username, set.id))
            .await
        {
            tracing::error!("Failed to queue creation of translation set {}: {}", set.id, err);
            if let Err(e) = self.sets.delete(set.id).await {
                tracing::error!("Failed to remove unqueued translation set {}: {}", set.id, e);
            }
            return Err(err);
        }

        tracing::info!(
            "User {} created translation set {} ({})",
            ctx.username,
            set.composite_label(),
            set.id
        );
        Ok(set)
    }

    /// Lists the sets of a code system, optionally within one refset.
    ///
    /// Sets still marked `DELETING` whose platform label is already gone
    /// are purged and left out. `READY` sets carry a platform browse URL.
    pub async fn list_sets(
        &self,
        ctx: &RequestContext,
        codesystem: &str,
        refset: Option<&str>,
    ) -> Result<Vec<TranslationSet>, AppError> {
        let sets = self.sets.find_by_codesystem(codesystem, refset).await?;
        let platform = self.clients.platform(&ctx.username)?;
        let web_url = platform.web_url();

        let mut listed = Vec::with_capacity(sets.len());
        for mut set in sets {
            match set.status {
                TranslationSetStatus::Deleting => {
                    let label = platform
                        .get_label(PLATFORM_PROJECT, &set.composite_label())
                        .await?;
                    if label.is_none() {
                        tracing::info!("Purging deleted translation set {}", set.id);
                        self.sets.delete(set.id).await?;
                        continue;
                    }
                }
                TranslationSetStatus::Ready => {
                    set.platform_url = Some(browse_url(&web_url, &set));
                }
                _ => {}
            }
            listed.push(set);
        }
        Ok(listed)
    }

    /// Finds a set by code system, refset and label.
    pub async fn find_set(
        &self,
        codesystem: &str,
        refset: &str,
        label: &str,
    ) -> Result<TranslationSet, AppError> {
        self.sets
            .find_by_identity(codesystem, label, refset)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Translation set not found: {label}")))
    }

    /// Replaces the AI fields of a set. Other fields are immutable.
    pub async fn update_set(
        &self,
        ctx: &RequestContext,
        codesystem: &str,
        refset: &str,
        label: &str,
        update: UpdateTranslationSet,
    ) -> Result<TranslationSet, AppError> {
        let mut set = self.find_set(codesystem, refset, label).await?;
        if let Some(advice) = update.ai_language_advice {
            set.ai_language_advice = Some(advice);
        }
        if let Some(golden_set) = update.ai_golden_set {
            set.ai_golden_set = golden_set;
        }
        set.updated_at = chrono::Utc::now();
        if !self
            .sets
            .update_ai_fields(set.id, set.ai_language_advice.as_deref(), &set.ai_golden_set)
            .await?
        {
            return Err(AppError::not_found(format!("Translation set not found: {label}")));
        }

        tracing::info!("User {} updated translation set {}", ctx.username, set.id);
        Ok(set)
    }

    /// Queues the removal of a set and marks it `DELETING`.
    ///
    /// The job is queued first, so a set is never left `DELETING` without a
    /// removal on its way.
    pub async fn delete_set(
        &self,
        ctx: &RequestContext,
        codesystem: &str,
        refset: &str,
        label: &str,
    ) -> Result<TranslationSet, AppError> {
        let mut set = self.find_set(codesystem, refset, label).await?;
        self.queue
            .enqueue(JobMessage::new(JobType::Delete, &ctx.username, set.id))
            .await?;
        let mut deleting = set.progress();
        deleting.status = TranslationSetStatus::Deleting;
        self.sets.update_progress(set.id, &deleting).await?;
        set.apply_progress(&deleting);

        tracing::info!("User {} requested deletion of {}", ctx.username, set.id);
        Ok(set)
    }
}

/// Platform page listing the set's units.
pub fn browse_url(web_url: &str, set: &TranslationSet) -> String {
    format!(
        "{}/translate/{}/{}/{}/?q=label:\"{}\"",
        web_url,
        PLATFORM_PROJECT,
        PLATFORM_COMPONENT,
        set.language_code_with_refset(),
        set.composite_label()
    )
}
