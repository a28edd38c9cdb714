//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Background job worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the worker is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Number of concurrent job processing tasks.
    ///
    /// Jobs for the same translation set are never claimed concurrently,
    /// regardless of this value.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Interval in seconds between job queue polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Queue carrying translation set jobs.
    #[serde(default = "default_queue_name")]
    pub queue_name: String,
    /// A running job older than this is considered stuck and reclaimed.
    #[serde(default = "default_stale_timeout")]
    pub stale_job_timeout_minutes: i64,
    /// Cron expression (with seconds) for the stale-job reclamation task.
    #[serde(default = "default_reclaim_schedule")]
    pub reclaim_schedule: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            concurrency: default_concurrency(),
            poll_interval_seconds: default_poll_interval(),
            queue_name: default_queue_name(),
            stale_job_timeout_minutes: default_stale_timeout(),
            reclaim_schedule: default_reclaim_schedule(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_concurrency() -> usize {
    2
}

fn default_poll_interval() -> u64 {
    2
}

fn default_queue_name() -> String {
    "translation-set.processing".to_string()
}

fn default_stale_timeout() -> i64 {
    240
}

fn default_reclaim_schedule() -> String {
    "0 */10 * * * *".to_string()
}
