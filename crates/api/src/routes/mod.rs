pub mod characters;
pub mod health;
pub mod scenes;
pub mod shots;
pub mod snapshots;
pub mod versions;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::session;
use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /ws                                  WebSocket state subscription
///
/// /state                               full observed state (GET)
/// /intents                             generic intent dispatch (POST)
/// /references/dangling                 unresolved soft references (GET)
///
/// /versions                            script version log
/// /scenes                              scenes and their references
/// /characters                          character records
/// /shots                               shot sequence and generation
/// /snapshots                           whole-document history
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/state", get(session::get_state))
        .route("/intents", post(session::dispatch_intent))
        .route(
            "/references/dangling",
            get(session::list_dangling_references),
        )
        .nest("/versions", versions::router())
        .nest("/scenes", scenes::router())
        .nest("/characters", characters::router())
        .nest("/shots", shots::router())
        .nest("/snapshots", snapshots::router())
}
