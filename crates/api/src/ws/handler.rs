use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use storymaker_core::gateway::Intent;
use storymaker_events::{DocumentEvent, SESSION_STATE};

use crate::engine::MutationGateway;
use crate::error::AppError;
use crate::state::AppState;
use crate::ws::manager::WsManager;

/// HTTP handler that upgrades the connection to WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.ws_manager, state.gateway))
}

/// Manage a single subscriber connection after upgrade.
///
/// The client first receives the full current state, then every event
/// published on the bus. Events may interleave with the initial state, so
/// clients keep whichever carries the highest `revision`. Text frames from
/// the client are parsed as intents and answered on the same connection.
async fn handle_socket(socket: WebSocket, ws_manager: Arc<WsManager>, gateway: Arc<MutationGateway>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, "WebSocket connected");

    let mut rx = ws_manager.add(conn_id.clone()).await;

    match initial_state_frame(&gateway).await {
        Ok(text) => {
            ws_manager.send_to(&conn_id, Message::Text(text.into())).await;
        }
        Err(e) => tracing::error!(conn_id = %conn_id, error = %e, "Failed to serialize initial state"),
    }

    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(Message::Text(text)) => {
                let reply = handle_intent_message(&gateway, text.as_str()).await;
                ws_manager
                    .send_to(&conn_id, Message::Text(reply.to_string().into()))
                    .await;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    let connected_secs = ws_manager
        .remove(&conn_id)
        .await
        .map(|open_for| open_for.num_seconds());
    send_task.abort();
    tracing::info!(conn_id = %conn_id, ?connected_secs, "WebSocket disconnected");
}

/// The `session.state` frame sent to a subscriber right after it connects.
async fn initial_state_frame(gateway: &MutationGateway) -> Result<String, serde_json::Error> {
    let event = DocumentEvent::new(SESSION_STATE, Arc::new(gateway.state().await));
    serde_json::to_string(&event)
}

/// Apply an intent received over the socket and build the reply frame.
///
/// Failures carry the same `code` values as the HTTP error responses.
async fn handle_intent_message(gateway: &MutationGateway, text: &str) -> serde_json::Value {
    let result = match serde_json::from_str::<Intent>(text) {
        Ok(intent) => gateway.apply(intent).await.map_err(AppError::from),
        Err(e) => Err(AppError::BadRequest(format!("Invalid intent: {e}"))),
    };

    match result {
        Ok(applied) => serde_json::json!({
            "type": "intent_result",
            "ok": true,
            "data": applied,
        }),
        Err(err) => {
            let (_, code, message) = err.parts();
            serde_json::json!({
                "type": "intent_result",
                "ok": false,
                "code": code,
                "error": message,
            })
        }
    }
}
