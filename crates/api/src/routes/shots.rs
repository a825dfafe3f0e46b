use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::shots;
use crate::state::AppState;

/// Routes mounted at `/shots`.
///
/// ```text
/// GET    /                          list
/// POST   /                          create
/// POST   /move                      move_shot
/// POST   /generate                  save_with_generation
/// PUT    /{id}                      update
/// DELETE /{id}                      delete
/// PUT    /{id}/generated-image      attach_image
/// POST   /{id}/generate-image       regenerate_image
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(shots::list).post(shots::create))
        .route("/move", post(shots::move_shot))
        .route("/generate", post(shots::save_with_generation))
        .route("/{id}", put(shots::update).delete(shots::delete))
        .route("/{id}/generated-image", put(shots::attach_image))
        .route("/{id}/generate-image", post(shots::regenerate_image))
}
