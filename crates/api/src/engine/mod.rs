//! Session engine.
//!
//! Holds the shared [`MutationGateway`] that serializes every intent against
//! the live session and publishes the resulting state on the event bus.

pub mod gateway;

pub use gateway::MutationGateway;
