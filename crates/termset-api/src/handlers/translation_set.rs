//! Translation set handlers.
//!
//! Every route is scoped by `{codesystem}` and `{refset}`; item routes add
//! the set `{label}`.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use termset_entity::platform::Unit;
use termset_entity::translation_set::TranslationSet;

use crate::dto::request::{
    AiTranslateRequest, AssignWorkRequest, CreateSetRequest, SampleQuery, UpdateSetRequest,
    validated,
};
use crate::dto::response::StateCountResponse;
use crate::error::ApiError;
use crate::extractors::ActingUser;
use crate::state::AppState;

/// GET /api/{codesystem}/translations/{refset}/sets
pub async fn list_sets(
    State(state): State<AppState>,
    user: ActingUser,
    Path((codesystem, refset)): Path<(String, String)>,
) -> Result<Json<Vec<TranslationSet>>, ApiError> {
    let sets = state
        .translation_sets
        .list_sets(&user, &codesystem, Some(&refset))
        .await?;
    Ok(Json(sets))
}

/// POST /api/{codesystem}/translations/{refset}/sets
pub async fn create_set(
    State(state): State<AppState>,
    user: ActingUser,
    Path((codesystem, refset)): Path<(String, String)>,
    Json(req): Json<CreateSetRequest>,
) -> Result<(StatusCode, Json<TranslationSet>), ApiError> {
    let req = validated(req)?;
    let set = state
        .translation_sets
        .create_set(&user, req.into_entity(codesystem, refset))
        .await?;
    Ok((StatusCode::ACCEPTED, Json(set)))
}

/// GET /api/{codesystem}/translations/{refset}/sets/{label}
pub async fn get_set(
    State(state): State<AppState>,
    _user: ActingUser,
    Path((codesystem, refset, label)): Path<(String, String, String)>,
) -> Result<Json<TranslationSet>, ApiError> {
    let set = state
        .translation_sets
        .find_set(&codesystem, &refset, &label)
        .await?;
    Ok(Json(set))
}

/// PUT /api/{codesystem}/translations/{refset}/sets/{label}
pub async fn update_set(
    State(state): State<AppState>,
    user: ActingUser,
    Path((codesystem, refset, label)): Path<(String, String, String)>,
    Json(req): Json<UpdateSetRequest>,
) -> Result<Json<TranslationSet>, ApiError> {
    let set = state
        .translation_sets
        .update_set(&user, &codesystem, &refset, &label, req.into())
        .await?;
    Ok(Json(set))
}

/// DELETE /api/{codesystem}/translations/{refset}/sets/{label}
pub async fn delete_set(
    State(state): State<AppState>,
    user: ActingUser,
    Path((codesystem, refset, label)): Path<(String, String, String)>,
) -> Result<(StatusCode, Json<TranslationSet>), ApiError> {
    let set = state
        .translation_sets
        .delete_set(&user, &codesystem, &refset, &label)
        .await?;
    Ok((StatusCode::ACCEPTED, Json(set)))
}

/// POST /api/{codesystem}/translations/{refset}/sets/{label}/refresh
pub async fn refresh_set(
    State(state): State<AppState>,
    user: ActingUser,
    Path((codesystem, refset, label)): Path<(String, String, String)>,
) -> Result<(StatusCode, Json<TranslationSet>), ApiError> {
    let set = state
        .translation_sets
        .refresh_set(&user, &codesystem, &refset, &label)
        .await?;
    Ok((StatusCode::ACCEPTED, Json(set)))
}

/// POST /api/{codesystem}/translations/{refset}/sets/{label}/assign-work
pub async fn assign_work(
    State(state): State<AppState>,
    user: ActingUser,
    Path((codesystem, refset, label)): Path<(String, String, String)>,
    Json(req): Json<AssignWorkRequest>,
) -> Result<(StatusCode, Json<TranslationSet>), ApiError> {
    let req = validated(req)?;
    let set = state
        .translation_sets
        .assign_work(&user, &codesystem, &refset, &label, req.into())
        .await?;
    Ok((StatusCode::ACCEPTED, Json(set)))
}

/// POST /api/{codesystem}/translations/{refset}/sets/{label}/ai-translate
pub async fn ai_translate(
    State(state): State<AppState>,
    user: ActingUser,
    Path((codesystem, refset, label)): Path<(String, String, String)>,
    Json(req): Json<AiTranslateRequest>,
) -> Result<(StatusCode, Json<TranslationSet>), ApiError> {
    let req = validated(req)?;
    let set = state
        .translation_sets
        .batch_ai_translate(&user, &codesystem, &refset, &label, req.into())
        .await?;
    Ok((StatusCode::ACCEPTED, Json(set)))
}

/// GET /api/{codesystem}/translations/{refset}/sets/{label}/state-count/{state}
pub async fn state_count(
    State(state): State<AppState>,
    user: ActingUser,
    Path((codesystem, refset, label, unit_state)): Path<(String, String, String, String)>,
) -> Result<Json<StateCountResponse>, ApiError> {
    let count = state
        .translation_sets
        .state_count(&user, &codesystem, &refset, &label, &unit_state)
        .await?;
    Ok(Json(StateCountResponse {
        state: unit_state,
        count,
    }))
}

/// GET /api/{codesystem}/translations/{refset}/sets/{label}/sample?pageSize=
pub async fn sample_units(
    State(state): State<AppState>,
    user: ActingUser,
    Path((codesystem, refset, label)): Path<(String, String, String)>,
    Query(query): Query<SampleQuery>,
) -> Result<Json<Vec<Unit>>, ApiError> {
    let units = state
        .translation_sets
        .sample_units(&user, &codesystem, &refset, &label, query.page_size)
        .await?;
    Ok(Json(units))
}
