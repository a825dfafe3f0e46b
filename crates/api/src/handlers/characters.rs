//! Handlers for the `/characters` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use storymaker_core::gateway::{Applied, Intent};
use storymaker_core::models::{Character, CreateCharacter};
use storymaker_core::types::EntityId;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/characters
pub async fn list(State(state): State<AppState>) -> Json<DataResponse<Vec<Character>>> {
    let characters = state
        .gateway
        .read(|session| session.document().characters().to_vec())
        .await;
    Json(DataResponse::new(characters))
}

/// POST /api/v1/characters
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateCharacter>,
) -> AppResult<(StatusCode, Json<DataResponse<Applied>>)> {
    let applied = state
        .gateway
        .apply(Intent::AddCharacter { character: input })
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(applied))))
}

/// PUT /api/v1/characters/{id}
///
/// Replaces the whole record; the id comes from the path.
pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<EntityId>,
    AppJson(input): AppJson<CreateCharacter>,
) -> AppResult<Json<DataResponse<Applied>>> {
    let applied = state
        .gateway
        .apply(Intent::UpdateCharacter {
            character: input.into_character(id),
        })
        .await?;
    Ok(Json(DataResponse::new(applied)))
}

/// DELETE /api/v1/characters/{id}
///
/// References to the character held by scenes and shots are left in place.
pub async fn delete(
    State(state): State<AppState>,
    AppPath(id): AppPath<EntityId>,
) -> AppResult<Json<DataResponse<Applied>>> {
    let applied = state.gateway.apply(Intent::DeleteCharacter { id }).await?;
    Ok(Json(DataResponse::new(applied)))
}
