//! Handlers for the script version log.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use storymaker_core::diff::LineDiff;
use storymaker_core::gateway::{Applied, Intent};
use storymaker_core::models::{CurrentVersion, ScriptVersion};
use storymaker_core::versions::diff_versions;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct VersionText {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct VersionLog {
    pub versions: Vec<ScriptVersion>,
    pub current: CurrentVersion,
}

/// GET /api/v1/versions
pub async fn list(State(state): State<AppState>) -> Json<DataResponse<VersionLog>> {
    let log = state
        .gateway
        .read(|session| VersionLog {
            versions: session.document().versions().to_vec(),
            current: session.document().current_version().clone(),
        })
        .await;
    Json(DataResponse::new(log))
}

/// POST /api/v1/versions
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<VersionText>,
) -> AppResult<(StatusCode, Json<DataResponse<Applied>>)> {
    let applied = state
        .gateway
        .apply(Intent::AddVersion { text: input.text })
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(applied))))
}

/// PUT /api/v1/versions/current
pub async fn set_current(
    State(state): State<AppState>,
    AppJson(input): AppJson<VersionText>,
) -> AppResult<Json<DataResponse<Applied>>> {
    let applied = state
        .gateway
        .apply(Intent::SetCurrentVersion { text: input.text })
        .await?;
    Ok(Json(DataResponse::new(applied)))
}

/// POST /api/v1/versions/{number}/revert
pub async fn revert(
    State(state): State<AppState>,
    AppPath(number): AppPath<usize>,
) -> AppResult<Json<DataResponse<Applied>>> {
    let applied = state
        .gateway
        .apply(Intent::RevertToVersion { number })
        .await?;
    Ok(Json(DataResponse::new(applied)))
}

/// GET /api/v1/versions/{from}/diff/{to}
///
/// The versions are cloned out of the session and compared on the blocking
/// pool, so mutations are not held up by a long comparison.
pub async fn diff(
    State(state): State<AppState>,
    AppPath((from, to)): AppPath<(usize, usize)>,
) -> AppResult<Json<DataResponse<Vec<LineDiff>>>> {
    let (old, new) = state
        .gateway
        .read(|session| {
            session
                .document()
                .version_pair(from, to)
                .map(|(old, new)| (old.clone(), new.clone()))
        })
        .await?;

    let lines = tokio::task::spawn_blocking(move || diff_versions(&old, &new))
        .await
        .map_err(|e| AppError::InternalError(format!("Diff task failed: {e}")))??;
    Ok(Json(DataResponse::new(lines)))
}
