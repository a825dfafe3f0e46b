//! Stability-style text-to-image client.
//!
//! Implements the core [`ImageGenerator`](storymaker_core::generation::ImageGenerator)
//! port over the provider's REST API using [`reqwest`].

pub mod api;
pub mod config;

pub use api::{StabilityApiError, StabilityClient};
pub use config::{GenerationParams, StabilityConfig};
