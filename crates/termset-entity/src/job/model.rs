//! Job entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::message::JobMessage;
use super::status::{JobStatus, JobType};

/// A queued unit of work against one translation set.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    /// Unique job identifier.
    pub id: Uuid,
    /// What the job does.
    pub job_type: JobType,
    /// Queue name.
    pub queue: String,
    /// User on whose behalf the job runs.
    pub acting_user: String,
    /// Translation set the job operates on.
    pub target_set_id: Uuid,
    /// Serialized request object, for payload-bearing job types.
    pub payload: Option<String>,
    /// Current job status.
    pub status: JobStatus,
    /// Error message on failure.
    pub error_message: Option<String>,
    /// When the job started executing.
    pub started_at: Option<DateTime<Utc>>,
    /// When the job completed or failed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Worker ID that picked up the job.
    pub worker_id: Option<String>,
    /// When the job was created.
    pub created_at: DateTime<Utc>,
    /// When the job was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Build a pending job from creation data.
    pub fn pending(data: CreateJob) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            job_type: data.message.job_type,
            queue: data.queue,
            acting_user: data.message.acting_user,
            target_set_id: data.message.target_set_id,
            payload: data.message.payload,
            status: JobStatus::Pending,
            error_message: None,
            started_at: None,
            completed_at: None,
            worker_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The message this job carries.
    pub fn message(&self) -> JobMessage {
        JobMessage {
            job_type: self.job_type,
            acting_user: self.acting_user.clone(),
            target_set_id: self.target_set_id,
            payload: self.payload.clone(),
        }
    }
}

/// Data required to create a new job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJob {
    /// Queue name.
    pub queue: String,
    /// Message to deliver.
    pub message: JobMessage,
}
