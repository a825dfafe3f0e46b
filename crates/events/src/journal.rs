//! Event journal service.
//!
//! [`EventJournal`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and writes a structured trace line for every [`DocumentEvent`]. It runs
//! as a long-lived background task and exits when the bus is dropped.

use tokio::sync::broadcast;

use crate::bus::{DocumentEvent, GENERATION_FAILED};

pub struct EventJournal;

impl EventJournal {
    /// Run the journal loop. Returns the number of events recorded.
    pub async fn run(mut receiver: broadcast::Receiver<DocumentEvent>) -> u64 {
        let mut recorded = 0u64;
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    Self::record(&event);
                    recorded += 1;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event journal lagged, some events were not recorded");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!(recorded, "Event bus closed, journal shutting down");
                    break;
                }
            }
        }
        recorded
    }

    fn record(event: &DocumentEvent) {
        let intent = event.intent.as_deref().unwrap_or("-");
        if event.event_type == GENERATION_FAILED {
            tracing::warn!(
                event_type = %event.event_type,
                intent,
                revision = event.revision,
                payload = %event.payload,
                "Shot stored without generated image"
            );
        } else {
            tracing::info!(
                event_type = %event.event_type,
                intent,
                revision = event.revision,
                shots = event.state.shot_count,
                snapshot_cursor = event.state.snapshot_cursor,
                "Document event"
            );
        }
    }
}
