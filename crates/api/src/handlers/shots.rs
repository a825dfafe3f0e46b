//! Handlers for the `/shots` resource, including image generation.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use storymaker_core::gateway::{Applied, Intent, ShotSaveReport};
use storymaker_core::models::{CreateShot, Shot};
use storymaker_core::relations::{shot_views, ShotView, SHOT_PLANNING_TARGET};
use storymaker_core::types::{new_entity_id, EntityId, MediaRef};

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ShotListing {
    pub shots: Vec<Shot>,
    pub views: Vec<ShotView>,
    pub shot_count: usize,
    pub shot_target: usize,
}

#[derive(Debug, Deserialize)]
pub struct MoveShotRequest {
    pub from_index: i64,
    pub to_index: i64,
}

#[derive(Debug, Deserialize)]
pub struct AttachImageRequest {
    #[serde(default)]
    pub image: Option<MediaRef>,
}

/// Shot form submitted for save-with-generation. Without an `id` the shot
/// is appended under a fresh one.
#[derive(Debug, Deserialize)]
pub struct SaveShotRequest {
    #[serde(default)]
    pub id: Option<EntityId>,
    #[serde(flatten)]
    pub shot: CreateShot,
}

/// GET /api/v1/shots
pub async fn list(State(state): State<AppState>) -> Json<DataResponse<ShotListing>> {
    let listing = state
        .gateway
        .read(|session| {
            let doc = session.document();
            ShotListing {
                shots: doc.shots().to_vec(),
                views: shot_views(doc),
                shot_count: doc.shots().len(),
                shot_target: SHOT_PLANNING_TARGET,
            }
        })
        .await;
    Json(DataResponse::new(listing))
}

/// POST /api/v1/shots
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateShot>,
) -> AppResult<(StatusCode, Json<DataResponse<Applied>>)> {
    let applied = state.gateway.apply(Intent::AddShot { shot: input }).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(applied))))
}

/// PUT /api/v1/shots/{id}
///
/// Replaces the whole record in place; position in the sequence is kept.
pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<EntityId>,
    AppJson(input): AppJson<CreateShot>,
) -> AppResult<Json<DataResponse<Applied>>> {
    let applied = state
        .gateway
        .apply(Intent::UpdateShot {
            shot: input.into_shot(id),
        })
        .await?;
    Ok(Json(DataResponse::new(applied)))
}

/// DELETE /api/v1/shots/{id}
pub async fn delete(
    State(state): State<AppState>,
    AppPath(id): AppPath<EntityId>,
) -> AppResult<Json<DataResponse<Applied>>> {
    let applied = state.gateway.apply(Intent::DeleteShot { id }).await?;
    Ok(Json(DataResponse::new(applied)))
}

/// POST /api/v1/shots/move
pub async fn move_shot(
    State(state): State<AppState>,
    AppJson(input): AppJson<MoveShotRequest>,
) -> AppResult<Json<DataResponse<Applied>>> {
    let applied = state
        .gateway
        .apply(Intent::MoveShot {
            from_index: input.from_index,
            to_index: input.to_index,
        })
        .await?;
    Ok(Json(DataResponse::new(applied)))
}

/// PUT /api/v1/shots/{id}/generated-image
pub async fn attach_image(
    State(state): State<AppState>,
    AppPath(id): AppPath<EntityId>,
    AppJson(input): AppJson<AttachImageRequest>,
) -> AppResult<Json<DataResponse<Applied>>> {
    let applied = state
        .gateway
        .apply(Intent::AttachGeneratedImage {
            id,
            image: input.image,
        })
        .await?;
    Ok(Json(DataResponse::new(applied)))
}

/// POST /api/v1/shots/generate
///
/// Generates an image from the description, then saves the shot. A failed
/// generation still stores the shot; the failure is in `generation_error`.
/// The save runs on its own task and completes even if this request times
/// out or the client goes away.
pub async fn save_with_generation(
    State(state): State<AppState>,
    AppJson(input): AppJson<SaveShotRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<ShotSaveReport>>)> {
    let id = input.id.unwrap_or_else(new_entity_id);
    let report = Arc::clone(&state.gateway)
        .save_shot_with_generation_detached(input.shot.into_shot(id))
        .await?;
    let status = if report.inserted {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(DataResponse::new(report))))
}

/// POST /api/v1/shots/{id}/generate-image
pub async fn regenerate_image(
    State(state): State<AppState>,
    AppPath(id): AppPath<EntityId>,
) -> AppResult<Json<DataResponse<Applied>>> {
    let applied = state.gateway.regenerate_image(id).await?;
    Ok(Json(DataResponse::new(applied)))
}
