use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::scenes;
use crate::state::AppState;

/// Routes mounted at `/scenes`.
///
/// ```text
/// GET    /                              list
/// POST   /                              create
/// DELETE /{tag}                         delete
/// POST   /{tag}/characters/{id}         link_character
/// DELETE /{tag}/characters/{id}         unlink_character
/// POST   /{tag}/shots/{id}              link_shot
/// DELETE /{tag}/shots/{id}              unlink_shot
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(scenes::list).post(scenes::create))
        .route("/{tag}", delete(scenes::delete))
        .route(
            "/{tag}/characters/{id}",
            post(scenes::link_character).delete(scenes::unlink_character),
        )
        .route(
            "/{tag}/shots/{id}",
            post(scenes::link_shot).delete(scenes::unlink_shot),
        )
}
