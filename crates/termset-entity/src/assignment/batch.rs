//! Batch AI-translation request.

use serde::{Deserialize, Serialize};
use termset_core::AppError;

/// Parameters of one batch AI-translation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchTranslateRequest {
    /// Total number of units to process.
    pub size: u32,
    /// Ask for two ranked suggestions per unit instead of one.
    #[serde(default)]
    pub dual_suggestions: bool,
    /// Use the faster, cheaper model.
    #[serde(default)]
    pub fast: bool,
}

impl BatchTranslateRequest {
    /// Reject a zero-sized batch.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.size == 0 {
            return Err(AppError::validation("Batch size must be greater than zero."));
        }
        Ok(())
    }
}
