//! Response DTOs.

use serde::{Deserialize, Serialize};

/// `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok` when the server answers.
    pub status: String,
    /// Crate version.
    pub version: String,
}

/// `GET .../state-count/{state}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateCountResponse {
    /// Platform state counted.
    pub state: String,
    /// Number of units in that state.
    pub count: u64,
}
