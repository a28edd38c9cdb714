//! Translation set processing tunables.

use serde::{Deserialize, Serialize};

/// Batch sizes and progress constants used by the set processors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Units labelled per bulk call while populating a new set.
    #[serde(default = "default_label_batch_size")]
    pub label_batch_size: usize,
    /// Units fetched per page while assigning work.
    #[serde(default = "default_assign_page_size")]
    pub assign_page_size: u32,
    /// Upper bound on units sent to the LLM per page.
    #[serde(default = "default_ai_page_size")]
    pub ai_page_size: u32,
    /// Percentage persisted when a request queues a job.
    #[serde(default = "default_start_percentage")]
    pub percentage_processed_start: i32,
    /// Highest progress reported while work assignment pages are streaming.
    #[serde(default = "default_assignment_cap")]
    pub assignment_progress_cap: i32,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            label_batch_size: default_label_batch_size(),
            assign_page_size: default_assign_page_size(),
            ai_page_size: default_ai_page_size(),
            percentage_processed_start: default_start_percentage(),
            assignment_progress_cap: default_assignment_cap(),
        }
    }
}

fn default_label_batch_size() -> usize {
    1000
}

fn default_assign_page_size() -> u32 {
    1000
}

fn default_ai_page_size() -> u32 {
    50
}

fn default_start_percentage() -> i32 {
    5
}

fn default_assignment_cap() -> i32 {
    90
}
