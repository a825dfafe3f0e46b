//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] fans out [`DocumentEvent`]s to every observer (WebSocket
//! clients, the journal). It is shared via `Arc<EventBus>`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use storymaker_core::gateway::SessionState;
use tokio::sync::broadcast;

/// Emitted after every successfully applied intent.
pub const DOCUMENT_CHANGED: &str = "document.changed";

/// Sent to a new subscriber as its initial full state.
pub const SESSION_STATE: &str = "session.state";

/// Emitted when a shot was stored but its image generation failed.
pub const GENERATION_FAILED: &str = "shot.generation_failed";

// ---------------------------------------------------------------------------
// DocumentEvent
// ---------------------------------------------------------------------------

/// A state change observed on the session.
///
/// Every event carries the complete [`SessionState`] at `revision`, so a
/// subscriber can render from the latest event alone and ignore any it
/// missed.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentEvent {
    /// Dot-separated event name, e.g. `"document.changed"`.
    pub event_type: String,

    /// Name of the intent that caused the change, if any.
    pub intent: Option<String>,

    pub revision: u64,

    pub state: Arc<SessionState>,

    /// Event-specific data (intent outcome, generation failure, ...).
    pub payload: serde_json::Value,

    pub timestamp: DateTime<Utc>,
}

impl DocumentEvent {
    pub fn new(event_type: impl Into<String>, state: Arc<SessionState>) -> Self {
        Self {
            event_type: event_type.into(),
            intent: None,
            revision: state.revision,
            state,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Shorthand for a [`DOCUMENT_CHANGED`] event.
    pub fn changed(state: Arc<SessionState>) -> Self {
        Self::new(DOCUMENT_CHANGED, state)
    }

    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = Some(intent.into());
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Slow receivers that fall more than the capacity behind observe
/// `RecvError::Lagged` and skip ahead.
pub struct EventBus {
    sender: broadcast::Sender<DocumentEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns the number of subscribers that received it (zero is fine).
    pub fn publish(&self, event: DocumentEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DocumentEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
