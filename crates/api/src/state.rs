use std::sync::Arc;

use storymaker_core::generation::{ImageGenerator, UnconfiguredGenerator};
use storymaker_events::EventBus;
use storymaker_imagegen::{StabilityApiError, StabilityClient};

use crate::config::ServerConfig;
use crate::engine::MutationGateway;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Owner of the live session; every mutation goes through it.
    pub gateway: Arc<MutationGateway>,
    /// WebSocket connection manager (browser clients).
    pub ws_manager: Arc<WsManager>,
    pub event_bus: Arc<EventBus>,
}

impl AppState {
    /// Fresh state with an empty session and the given image generator.
    pub fn new(config: ServerConfig, generator: Arc<dyn ImageGenerator>) -> Self {
        let event_bus = Arc::new(EventBus::default());
        let gateway = Arc::new(MutationGateway::new(
            Arc::clone(&event_bus),
            generator,
            config.generation_timeout(),
        ));
        Self {
            config: Arc::new(config),
            gateway,
            ws_manager: Arc::new(WsManager::new()),
            event_bus,
        }
    }

    /// Fresh state using the provider configured in `config`, or a generator
    /// that always fails when none is set.
    pub fn from_config(config: ServerConfig) -> Result<Self, StabilityApiError> {
        let generator: Arc<dyn ImageGenerator> = match &config.stability {
            Some(stability) => Arc::new(StabilityClient::new(stability.clone())?),
            None => Arc::new(UnconfiguredGenerator),
        };
        Ok(Self::new(config, generator))
    }
}
