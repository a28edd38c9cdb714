//! Application state shared across all handlers.

use std::sync::Arc;

use termset_service::TranslationSetService;

/// Application state passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Translation set operations.
    pub translation_sets: Arc<TranslationSetService>,
}

impl AppState {
    /// Creates the handler state.
    pub fn new(translation_sets: Arc<TranslationSetService>) -> Self {
        Self { translation_sets }
    }
}
