//! Route definitions for the Termset HTTP API.
//!
//! All routes are mounted under `/api`.

use axum::Router;
use axum::routing::{get, post};

use crate::handlers;
use crate::state::AppState;

/// Build the router and thread `state` through every route.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(translation_set_routes())
        .route("/health", get(handlers::health::health));

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Translation set endpoints.
fn translation_set_routes() -> Router<AppState> {
    use handlers::translation_set as ts;

    Router::new()
        .route(
            "/{codesystem}/translations/{refset}/sets",
            get(ts::list_sets).post(ts::create_set),
        )
        .route(
            "/{codesystem}/translations/{refset}/sets/{label}",
            get(ts::get_set).put(ts::update_set).delete(ts::delete_set),
        )
        .route(
            "/{codesystem}/translations/{refset}/sets/{label}/refresh",
            post(ts::refresh_set),
        )
        .route(
            "/{codesystem}/translations/{refset}/sets/{label}/assign-work",
            post(ts::assign_work),
        )
        .route(
            "/{codesystem}/translations/{refset}/sets/{label}/ai-translate",
            post(ts::ai_translate),
        )
        .route(
            "/{codesystem}/translations/{refset}/sets/{label}/state-count/{state}",
            get(ts::state_count),
        )
        .route(
            "/{codesystem}/translations/{refset}/sets/{label}/sample",
            get(ts::sample_units),
        )
}
