use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::versions;
use crate::state::AppState;

/// Routes mounted at `/versions`.
///
/// ```text
/// GET    /                     list
/// POST   /                     create
/// PUT    /current              set_current
/// POST   /{number}/revert      revert
/// GET    /{from}/diff/{to}     diff
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(versions::list).post(versions::create))
        .route("/current", put(versions::set_current))
        .route("/{number}/revert", post(versions::revert))
        .route("/{from}/diff/{to}", get(versions::diff))
}
