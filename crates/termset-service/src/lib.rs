//! # termset-service
//!
//! Request-time operations on translation sets. Handlers validate input,
//! write the initial state and enqueue a job; the long-running work happens
//! in `termset-worker`.
//!
//! Services follow constructor injection: stores, the client factory and
//! the job queue are provided at construction time via `Arc` references.

pub mod context;
pub mod translation_set;

pub use context::RequestContext;
pub use translation_set::TranslationSetService;
