//! Route handlers.

pub mod health;
pub mod translation_set;
