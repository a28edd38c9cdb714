//! Custom Axum extractors.

pub mod user;

pub use user::{ActingUser, USERNAME_HEADER};
