//! Storymaker domain core.
//!
//! Pure, synchronous domain logic for the story-planning workspace:
//!
//! - [`document::Document`]: script versions, scenes, characters, shots.
//! - [`history::SnapshotLog`]: whole-document snapshots with a cursor.
//! - [`relations`]: soft-reference resolution and derived views.
//! - [`gateway::Session`]: the single entry point for applying intents.
//! - [`generation::ImageGenerator`]: port for text-to-image providers.

pub mod diff;
pub mod document;
pub mod error;
pub mod gateway;
pub mod generation;
pub mod history;
pub mod models;
pub mod relations;
pub mod sequencer;
pub mod types;
pub mod versions;

pub use error::CoreError;
