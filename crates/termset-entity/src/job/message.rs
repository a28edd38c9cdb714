//! Queue message carried from request handlers to workers.

use serde::{Deserialize, Serialize};
use termset_core::AppError;
use uuid::Uuid;

use super::status::JobType;

/// `(jobType, actingUser, targetSetId, optionalPayload)`.
///
/// The acting user travels with the message and is handed to processors
/// explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobMessage {
    /// What the job does.
    pub job_type: JobType,
    /// User on whose behalf the job runs.
    pub acting_user: String,
    /// Translation set the job operates on.
    pub target_set_id: Uuid,
    /// Serialized request object.
    pub payload: Option<String>,
}

impl JobMessage {
    /// Message without payload.
    pub fn new(job_type: JobType, acting_user: impl Into<String>, target_set_id: Uuid) -> Self {
        Self {
            job_type,
            acting_user: acting_user.into(),
            target_set_id,
            payload: None,
        }
    }

    /// Attach a request object serialized as JSON.
    pub fn with_request<T: Serialize>(mut self, request: &T) -> Result<Self, AppError> {
        self.payload = Some(serde_json::to_string(request)?);
        Ok(self)
    }

    /// Deserialize the attached request object.
    pub fn request<T: serde::de::DeserializeOwned>(&self) -> Result<T, AppError> {
        let raw = self.payload.as_deref().ok_or_else(|| {
            AppError::validation(format!("{} job is missing its request object", self.job_type))
        })?;
        Ok(serde_json::from_str(raw)?)
    }
}
