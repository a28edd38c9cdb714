//! Application builder: router, middleware and state.

use axum::Router;
use tower_http::trace::TraceLayer;

use termset_core::config::ServerConfig;

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState, server: &ServerConfig) -> Router {
    build_router(state)
        .layer(build_cors_layer(server))
        .layer(TraceLayer::new_for_http())
}
