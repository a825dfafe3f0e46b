//! Handlers for scenes and their character/shot references.
//!
//! Scenes are addressed by tag: `/scenes/{tag}` (percent-encoded).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use storymaker_core::gateway::{Applied, Intent};
use storymaker_core::relations::{scene_views, SceneView};
use storymaker_core::types::{EntityId, SceneTag};

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSceneRequest {
    pub tag: SceneTag,
}

/// GET /api/v1/scenes
pub async fn list(State(state): State<AppState>) -> Json<DataResponse<Vec<SceneView>>> {
    let views = state
        .gateway
        .read(|session| scene_views(session.document()))
        .await;
    Json(DataResponse::new(views))
}

/// POST /api/v1/scenes
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateSceneRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Applied>>)> {
    let applied = state
        .gateway
        .apply(Intent::AddScene { tag: input.tag })
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(applied))))
}

/// DELETE /api/v1/scenes/{tag}
///
/// Deleting an unknown tag succeeds with `changed: false`.
pub async fn delete(
    State(state): State<AppState>,
    AppPath(tag): AppPath<SceneTag>,
) -> AppResult<Json<DataResponse<Applied>>> {
    let applied = state.gateway.apply(Intent::DeleteScene { tag }).await?;
    Ok(Json(DataResponse::new(applied)))
}

/// POST /api/v1/scenes/{tag}/characters/{id}
pub async fn link_character(
    State(state): State<AppState>,
    AppPath((tag, character_id)): AppPath<(SceneTag, EntityId)>,
) -> AppResult<Json<DataResponse<Applied>>> {
    let applied = state
        .gateway
        .apply(Intent::LinkSceneCharacter { tag, character_id })
        .await?;
    Ok(Json(DataResponse::new(applied)))
}

/// DELETE /api/v1/scenes/{tag}/characters/{id}
pub async fn unlink_character(
    State(state): State<AppState>,
    AppPath((tag, character_id)): AppPath<(SceneTag, EntityId)>,
) -> AppResult<Json<DataResponse<Applied>>> {
    let applied = state
        .gateway
        .apply(Intent::UnlinkSceneCharacter { tag, character_id })
        .await?;
    Ok(Json(DataResponse::new(applied)))
}

/// POST /api/v1/scenes/{tag}/shots/{id}
pub async fn link_shot(
    State(state): State<AppState>,
    AppPath((tag, shot_id)): AppPath<(SceneTag, EntityId)>,
) -> AppResult<Json<DataResponse<Applied>>> {
    let applied = state
        .gateway
        .apply(Intent::LinkSceneShot { tag, shot_id })
        .await?;
    Ok(Json(DataResponse::new(applied)))
}

/// DELETE /api/v1/scenes/{tag}/shots/{id}
pub async fn unlink_shot(
    State(state): State<AppState>,
    AppPath((tag, shot_id)): AppPath<(SceneTag, EntityId)>,
) -> AppResult<Json<DataResponse<Applied>>> {
    let applied = state
        .gateway
        .apply(Intent::UnlinkSceneShot { tag, shot_id })
        .await?;
    Ok(Json(DataResponse::new(applied)))
}
