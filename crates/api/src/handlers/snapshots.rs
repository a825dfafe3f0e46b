//! Handlers for the snapshot history.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use storymaker_core::gateway::{Applied, Intent};
use storymaker_core::history::{SnapshotSummary, StepDirection};

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TakeSnapshotRequest {
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StepRequest {
    pub direction: StepDirection,
}

#[derive(Debug, Serialize)]
pub struct SnapshotListing {
    pub snapshots: Vec<SnapshotSummary>,
    /// `-1` until the first snapshot is taken.
    pub cursor: i64,
    pub can_step_back: bool,
    pub can_step_forward: bool,
}

/// GET /api/v1/snapshots
pub async fn list(State(state): State<AppState>) -> Json<DataResponse<SnapshotListing>> {
    let listing = state
        .gateway
        .read(|session| {
            let log = session.snapshots();
            SnapshotListing {
                snapshots: log.summaries(),
                cursor: log.cursor_position(),
                can_step_back: log.can_step_back(),
                can_step_forward: log.can_step_forward(),
            }
        })
        .await;
    Json(DataResponse::new(listing))
}

/// POST /api/v1/snapshots
pub async fn take(
    State(state): State<AppState>,
    AppJson(input): AppJson<TakeSnapshotRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Applied>>)> {
    let applied = state
        .gateway
        .apply(Intent::TakeSnapshot { label: input.label })
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(applied))))
}

/// POST /api/v1/snapshots/{index}/navigate
///
/// Out-of-range indices are accepted and ignored (`moved: false`).
pub async fn navigate(
    State(state): State<AppState>,
    AppPath(index): AppPath<i64>,
) -> AppResult<Json<DataResponse<Applied>>> {
    let applied = state
        .gateway
        .apply(Intent::NavigateSnapshot { index })
        .await?;
    Ok(Json(DataResponse::new(applied)))
}

/// POST /api/v1/snapshots/step
pub async fn step(
    State(state): State<AppState>,
    AppJson(input): AppJson<StepRequest>,
) -> AppResult<Json<DataResponse<Applied>>> {
    let applied = state
        .gateway
        .apply(Intent::StepSnapshot {
            direction: input.direction,
        })
        .await?;
    Ok(Json(DataResponse::new(applied)))
}
