//! Storymaker API server library.
//!
//! Exposes config, state, error handling, the session engine, routes and
//! WebSocket infrastructure so integration tests and the binary entrypoint
//! share them.

pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod ws;
