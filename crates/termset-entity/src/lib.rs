//! # termset-entity
//!
//! Domain entity models for Termset. Every struct in this crate represents a
//! database table row, a queued message, a request payload or a value
//! exchanged with the translation platform. Database entities additionally
//! derive `sqlx::FromRow`.

pub mod assignment;
pub mod job;
pub mod platform;
pub mod translation_set;

/// Translation platform project holding every translation set.
pub const PLATFORM_PROJECT: &str = "common";

/// Translation platform component holding every translation set.
pub const PLATFORM_COMPONENT: &str = "snomedct";
