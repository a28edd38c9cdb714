//! PostgreSQL store implementations.

pub mod job;
pub mod translation_set;

pub use job::PgJobStore;
pub use translation_set::PgTranslationSetStore;
