//! Whole-session handlers: observed state, generic intent dispatch and the
//! dangling-reference report.

use axum::extract::State;
use axum::Json;
use storymaker_core::gateway::{Applied, Intent, SessionState};
use storymaker_core::relations::{dangling_references, DanglingReference};

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/state
pub async fn get_state(State(state): State<AppState>) -> Json<DataResponse<SessionState>> {
    Json(DataResponse::new(state.gateway.state().await))
}

/// POST /api/v1/intents
///
/// Body is a tagged intent, e.g. `{"type": "add_scene", "tag": "INT. LAB"}`.
pub async fn dispatch_intent(
    State(state): State<AppState>,
    AppJson(intent): AppJson<Intent>,
) -> AppResult<Json<DataResponse<Applied>>> {
    let applied = state.gateway.apply(intent).await?;
    Ok(Json(DataResponse::new(applied)))
}

/// GET /api/v1/references/dangling
pub async fn list_dangling_references(
    State(state): State<AppState>,
) -> Json<DataResponse<Vec<DanglingReference>>> {
    let refs = state
        .gateway
        .read(|session| dangling_references(session.document()))
        .await;
    tracing::debug!(count = refs.len(), "Dangling reference report");
    Json(DataResponse::new(refs))
}
