//! # termset-api
//!
//! HTTP API layer for Termset built on Axum.
//!
//! Exposes the translation set endpoints under
//! `/api/{codesystem}/translations/{refset}/sets`, maps [`AppError`] kinds
//! to status codes, and reads the acting user from the gateway header.
//!
//! [`AppError`]: termset_core::error::AppError

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
