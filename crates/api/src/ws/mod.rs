//! WebSocket infrastructure for live state subscription.
//!
//! Provides connection management, heartbeat monitoring, the bus-to-socket
//! state broadcaster, and the HTTP upgrade handler used by Axum routes.

mod broadcaster;
mod handler;
mod heartbeat;
pub mod manager;

pub use broadcaster::StateBroadcaster;
pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
