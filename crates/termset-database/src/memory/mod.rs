//! Process-local store implementations.
//!
//! State is lost on restart. Used when `database.provider = "memory"` and by
//! tests.

pub mod job;
pub mod translation_set;

pub use job::MemoryJobStore;
pub use translation_set::MemoryTranslationSetStore;
