use axum::routing::{get, put};
use axum::Router;

use crate::handlers::characters;
use crate::state::AppState;

/// Routes mounted at `/characters`.
///
/// ```text
/// GET    /          list
/// POST   /          create
/// PUT    /{id}      update
/// DELETE /{id}      delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(characters::list).post(characters::create))
        .route("/{id}", put(characters::update).delete(characters::delete))
}
