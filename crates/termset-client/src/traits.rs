//! Collaborator traits.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use termset_core::result::AppResult;
use termset_entity::platform::{Label, Unit, UnitPage, UnitQuery, UnitTranslation};

/// Lazy sequence of concept ids matching a selection query.
#[async_trait]
pub trait ConceptIdStream: Send {
    /// Next id, or `None` once the sequence is exhausted.
    async fn next_id(&mut self) -> AppResult<Option<String>>;

    /// Total number of matches, once the server has reported it.
    fn total(&self) -> Option<u64>;
}

/// Terminology server queries.
#[async_trait]
pub trait TerminologyClient: Send + Sync + std::fmt::Debug {
    /// Branch path holding a code system's content.
    async fn branch_for_codesystem(&self, codesystem: &str) -> AppResult<String>;

    /// Translation languages configured on a code system, keyed by refset id.
    async fn translation_languages(&self, codesystem: &str) -> AppResult<HashMap<String, String>>;

    /// Stream ids of concepts on `branch` matching `query`.
    async fn stream_matching_ids(
        &self,
        branch: &str,
        query: &str,
    ) -> AppResult<Box<dyn ConceptIdStream>>;
}

/// Translation platform operations.
#[async_trait]
pub trait TranslationPlatformClient: Send + Sync + std::fmt::Debug {
    /// One page of units matching `query`.
    async fn get_unit_page(&self, query: &UnitQuery) -> AppResult<UnitPage<Unit>>;

    /// Add label `label_id` to every unit whose context is in `context_ids`.
    /// Adding a label a unit already has is a no-op.
    async fn bulk_add_label(
        &self,
        project: &str,
        label_id: i64,
        context_ids: &[String],
    ) -> AppResult<()>;

    /// Upload ranked suggestions for units in one translation.
    async fn upload_translations(
        &self,
        language_code_with_refset: &str,
        translations: &[UnitTranslation],
    ) -> AppResult<()>;

    /// Fetch a label by name, creating it when absent.
    async fn get_create_label(&self, project: &str, name: &str, description: &str)
    -> AppResult<Label>;

    /// Fetch a label by name.
    async fn get_label(&self, project: &str, name: &str) -> AppResult<Option<Label>>;

    /// Delete a label by name. Missing labels are ignored.
    async fn delete_label(&self, project: &str, name: &str) -> AppResult<()>;

    /// Whether the translation slug has been initialised on the platform.
    async fn translation_exists(&self, language_code_with_refset: &str) -> AppResult<bool>;

    /// Browser-facing base URL.
    fn web_url(&self) -> String;
}

/// LLM chat completion.
#[async_trait]
pub trait LlmClient: Send + Sync + std::fmt::Debug {
    /// Send `prompt` and return the raw response text.
    async fn chat(&self, prompt: &str, use_fast_model: bool) -> AppResult<String>;
}

/// Builds collaborator clients for one job or request.
///
/// Clients are created per invocation and carry the acting user explicitly.
pub trait ClientFactory: Send + Sync + std::fmt::Debug + 'static {
    /// Terminology client for `selection_scope`.
    fn terminology(
        &self,
        acting_user: &str,
        selection_scope: &str,
    ) -> AppResult<Arc<dyn TerminologyClient>>;

    /// Translation platform client.
    fn platform(&self, acting_user: &str) -> AppResult<Arc<dyn TranslationPlatformClient>>;

    /// LLM client.
    fn llm(&self) -> AppResult<Arc<dyn LlmClient>>;
}
