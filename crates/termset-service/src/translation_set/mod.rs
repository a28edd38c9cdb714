//! Translation set operations.

pub mod processing;
pub mod service;
pub mod units;

pub use service::TranslationSetService;
