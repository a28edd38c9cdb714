//! Background processing of translation set jobs.
//!
//! This crate provides:
//! - A job queue facade over the durable job store
//! - A worker runner that claims jobs and executes them
//! - A job executor that owns the set lifecycle around each handler
//! - The creation, work assignment, batch AI-translation and delete processors
//! - A cron scheduler that reclaims stuck jobs

pub mod distribution;
pub mod executor;
pub mod jobs;
pub mod progress;
pub mod queue;
pub mod runner;
pub mod scheduler;
pub mod suggestion;

pub use executor::{JobExecutionError, JobExecutor, JobHandler};
pub use progress::ProgressTracker;
pub use queue::JobQueue;
pub use runner::WorkerRunner;
pub use scheduler::CronScheduler;
