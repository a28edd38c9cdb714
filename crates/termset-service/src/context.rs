//! Request context carrying the acting user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Context for the current request.
///
/// Passed into service methods so that every operation, and every job it
/// enqueues, knows *who* is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// Username supplied by the authenticating gateway.
    pub username: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            request_time: Utc::now(),
        }
    }
}
