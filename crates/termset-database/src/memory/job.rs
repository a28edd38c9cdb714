//! In-memory job store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use termset_core::result::AppResult;
use termset_entity::job::{CreateJob, Job, JobStatus};

use crate::traits::JobStore;

/// Jobs held in insertion order behind a single mutex, so claiming and
/// leasing happen atomically.
#[derive(Debug, Clone, Default)]
pub struct MemoryJobStore {
    jobs: Arc<Mutex<Vec<Job>>>,
}

impl MemoryJobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every job, oldest first.
    pub async fn all(&self) -> Vec<Job> {
        self.jobs.lock().await.clone()
    }

    async fn finish(&self, id: Uuid, status: JobStatus, error_message: Option<&str>) -> bool {
        let mut jobs = self.jobs.lock().await;
        let Some(job) = jobs
            .iter_mut()
            .find(|j| j.id == id && j.status == JobStatus::Running)
        else {
            return false;
        };
        let now = Utc::now();
        job.status = status;
        job.error_message = error_message.map(str::to_string);
        job.completed_at = Some(now);
        job.updated_at = now;
        true
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn create(&self, data: &CreateJob) -> AppResult<Job> {
        let job = Job::pending(data.clone());
        self.jobs.lock().await.push(job.clone());
        Ok(job)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Job>> {
        Ok(self.jobs.lock().await.iter().find(|j| j.id == id).cloned())
    }

    async fn claim_next(&self, queue: &str, worker_id: &str) -> AppResult<Option<Job>> {
        let mut jobs = self.jobs.lock().await;
        let leased: Vec<Uuid> = jobs
            .iter()
            .filter(|j| j.status == JobStatus::Running)
            .map(|j| j.target_set_id)
            .collect();

        let Some(job) = jobs.iter_mut().find(|j| {
            j.queue == queue && j.status == JobStatus::Pending && !leased.contains(&j.target_set_id)
        }) else {
            return Ok(None);
        };

        let now = Utc::now();
        job.status = JobStatus::Running;
        job.started_at = Some(now);
        job.worker_id = Some(worker_id.to_string());
        job.error_message = None;
        job.updated_at = now;
        Ok(Some(job.clone()))
    }

    async fn mark_completed(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.finish(id, JobStatus::Completed, None).await)
    }

    async fn mark_failed(&self, id: Uuid, error_message: &str) -> AppResult<bool> {
        Ok(self.finish(id, JobStatus::Failed, Some(error_message)).await)
    }

    async fn find_stale(&self, before: DateTime<Utc>) -> AppResult<Vec<Job>> {
        Ok(self
            .jobs
            .lock()
            .await
            .iter()
            .filter(|j| j.status == JobStatus::Running && j.started_at.is_some_and(|t| t < before))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use termset_entity::job::{JobMessage, JobType};

    fn create_job(set_id: Uuid, job_type: JobType) -> CreateJob {
        CreateJob {
            queue: "q".to_string(),
            message: JobMessage::new(job_type, "alice", set_id),
        }
    }

    #[tokio::test]
    async fn test_claim_skips_leased_set() {
        let store = MemoryJobStore::new();
        let set_a = Uuid::new_v4();
        let set_b = Uuid::new_v4();
        let first = store.create(&create_job(set_a, JobType::Create)).await.unwrap();
        let second = store.create(&create_job(set_a, JobType::AssignWork)).await.unwrap();
        let third = store.create(&create_job(set_b, JobType::Create)).await.unwrap();

        let claimed = store.claim_next("q", "w1").await.unwrap().unwrap();
        assert_eq!(claimed.id, first.id);

        // Set A is leased, so the next claim moves on to set B.
        let claimed = store.claim_next("q", "w2").await.unwrap().unwrap();
        assert_eq!(claimed.id, third.id);
        assert!(store.claim_next("q", "w3").await.unwrap().is_none());

        store.mark_completed(first.id).await.unwrap();
        let claimed = store.claim_next("q", "w3").await.unwrap().unwrap();
        assert_eq!(claimed.id, second.id);
    }

    #[tokio::test]
    async fn test_claim_respects_queue() {
        let store = MemoryJobStore::new();
        store
            .create(&create_job(Uuid::new_v4(), JobType::Create))
            .await
            .unwrap();
        assert!(store.claim_next("other", "w1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_stale_and_fail() {
        let store = MemoryJobStore::new();
        let job = store
            .create(&create_job(Uuid::new_v4(), JobType::Create))
            .await
            .unwrap();
        store.claim_next("q", "w1").await.unwrap();

        let cutoff = Utc::now() + chrono::Duration::seconds(1);
        let stale = store.find_stale(cutoff).await.unwrap();
        assert_eq!(stale.len(), 1);

        assert!(store.mark_failed(job.id, "Processing timed out").await.unwrap());
        let failed = store.find_by_id(job.id).await.unwrap().unwrap();
        assert_eq!(failed.status, JobStatus::Failed);
        assert!(store.find_stale(cutoff).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reclaimed_job_cannot_complete() {
        let store = MemoryJobStore::new();
        let job = store
            .create(&create_job(Uuid::new_v4(), JobType::Create))
            .await
            .unwrap();
        assert!(!store.mark_completed(job.id).await.unwrap());

        store.claim_next("q", "w1").await.unwrap();
        assert!(store.mark_failed(job.id, "Processing timed out").await.unwrap());
        assert!(!store.mark_completed(job.id).await.unwrap());

        let stored = store.find_by_id(job.id).await.unwrap().unwrap();
        assert_eq!(stored.status, JobStatus::Failed);
        assert_eq!(stored.error_message.as_deref(), Some("Processing timed out"));
    }
}
