//! Forwards document events from the bus to every WebSocket subscriber.

use std::sync::Arc;

use axum::extract::ws::Message;
use storymaker_events::DocumentEvent;
use tokio::sync::broadcast;

use crate::ws::WsManager;

pub struct StateBroadcaster {
    ws_manager: Arc<WsManager>,
}

impl StateBroadcaster {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run the forwarding loop until the bus is dropped.
    ///
    /// Every event carries the full state, so a lagging receiver simply
    /// continues with the next event it gets.
    pub async fn run(self, mut receiver: broadcast::Receiver<DocumentEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.forward(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "State broadcaster lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, state broadcaster shutting down");
                    break;
                }
            }
        }
    }

    async fn forward(&self, event: &DocumentEvent) {
        let text = match serde_json::to_string(event) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, event_type = %event.event_type, "Failed to serialize event");
                return;
            }
        };
        let delivered = self.ws_manager.broadcast(Message::Text(text.into())).await;
        tracing::debug!(
            event_type = %event.event_type,
            revision = event.revision,
            delivered,
            "Forwarded event to WebSocket clients"
        );
    }
}
