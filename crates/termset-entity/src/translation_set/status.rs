//! Translation set lifecycle states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a translation set.
///
/// `INITIALISING → PROCESSING → READY`, `PROCESSING → FAILED`,
/// `READY → PROCESSING → READY` for later batch operations, and any state
/// `→ DELETING` before removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "translation_set_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TranslationSetStatus {
    /// Accepted, waiting for the creation job.
    Initialising,
    /// A job currently owns the set.
    Processing,
    /// At rest; new batch operations may start.
    Ready,
    /// Finished by a release-style job.
    Completed,
    /// The last job failed; see the set's error message.
    Failed,
    /// Removal requested; the record disappears once the label is gone.
    Deleting,
}

impl TranslationSetStatus {
    /// Whether a new assignment or batch operation may start from this state.
    pub fn accepts_new_job(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Return the status as an uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initialising => "INITIALISING",
            Self::Processing => "PROCESSING",
            Self::Ready => "READY",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Deleting => "DELETING",
        }
    }
}

impl fmt::Display for TranslationSetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
