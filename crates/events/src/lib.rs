//! Storymaker observer bus.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DocumentEvent`]: envelope carrying the full session state after a
//!   mutation.
//! - [`EventJournal`]: background subscriber that traces every event.

pub mod bus;
pub mod journal;

pub use bus::{DocumentEvent, EventBus, DOCUMENT_CHANGED, GENERATION_FAILED, SESSION_STATE};
pub use journal::EventJournal;
