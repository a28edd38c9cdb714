//! Store traits shared by the PostgreSQL and in-memory backends.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use termset_core::result::AppResult;
use termset_entity::job::{CreateJob, Job};
use termset_entity::translation_set::{AiGoldenExample, SetProgress, TranslationSet};

/// Persisted translation set records.
#[async_trait]
pub trait TranslationSetStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a set by id.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<TranslationSet>>;

    /// Sets of a code system, optionally limited to one refset, ordered by name.
    async fn find_by_codesystem(
        &self,
        codesystem: &str,
        refset: Option<&str>,
    ) -> AppResult<Vec<TranslationSet>>;

    /// Find the set identified by `(codesystem, label, refset)`.
    async fn find_by_identity(
        &self,
        codesystem: &str,
        label: &str,
        refset: &str,
    ) -> AppResult<Option<TranslationSet>>;

    /// Insert a new set. Fails with `Conflict` if the identity is taken.
    async fn create(&self, set: &TranslationSet) -> AppResult<TranslationSet>;

    /// Write status, progress, size and error message of a set.
    ///
    /// Returns `false` when the set is gone or already `DELETING`; a set
    /// being deleted only changes by removal.
    async fn update_progress(&self, id: Uuid, progress: &SetProgress) -> AppResult<bool>;

    /// Replace the AI guidance fields. Returns `false` when the set is gone.
    async fn update_ai_fields(
        &self,
        id: Uuid,
        advice: Option<&str>,
        golden_set: &[AiGoldenExample],
    ) -> AppResult<bool>;

    /// Remove a set.
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// Durable job queue storage.
///
/// A job in `running` holds the lease on its target set: `claim_next` never
/// hands out a job whose set already has a running job.
#[async_trait]
pub trait JobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a pending job.
    async fn create(&self, data: &CreateJob) -> AppResult<Job>;

    /// Find a job by id.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Job>>;

    /// Claim the oldest pending job of `queue` whose set is not leased.
    async fn claim_next(&self, queue: &str, worker_id: &str) -> AppResult<Option<Job>>;

    /// Mark a running job completed, releasing its lease.
    ///
    /// Returns `false` when the job was no longer running, e.g. because it
    /// was reclaimed as stale.
    async fn mark_completed(&self, id: Uuid) -> AppResult<bool>;

    /// Mark a running job failed, releasing its lease. Returns `false` when
    /// the job was no longer running.
    async fn mark_failed(&self, id: Uuid, error_message: &str) -> AppResult<bool>;

    /// Running jobs started before `before`.
    async fn find_stale(&self, before: DateTime<Utc>) -> AppResult<Vec<Job>>;
}
