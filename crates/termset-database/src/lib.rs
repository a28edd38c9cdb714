//! # termset-database
//!
//! Persistence for translation sets and queued jobs. The store traits are
//! implemented twice: on PostgreSQL for production and on process-local maps
//! for development mode and tests.

pub mod memory;
pub mod repositories;
pub mod stores;
pub mod traits;

pub use memory::{MemoryJobStore, MemoryTranslationSetStore};
pub use repositories::{PgJobStore, PgTranslationSetStore};
pub use stores::Stores;
pub use traits::{JobStore, TranslationSetStore};
