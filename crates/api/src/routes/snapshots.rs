use axum::routing::{get, post};
use axum::Router;

use crate::handlers::snapshots;
use crate::state::AppState;

/// Routes mounted at `/snapshots`.
///
/// ```text
/// GET    /                     list
/// POST   /                     take
/// POST   /step                 step
/// POST   /{index}/navigate     navigate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(snapshots::list).post(snapshots::take))
        .route("/step", post(snapshots::step))
        .route("/{index}/navigate", post(snapshots::navigate))
}
