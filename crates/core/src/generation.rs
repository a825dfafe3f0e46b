//! Image generation port.
//!
//! The core never talks to an image provider directly. Callers pass an
//! [`ImageGenerator`] implementation; its result is applied to the document
//! afterwards as an ordinary mutation (see
//! [`Session::save_shot_with_result`](crate::gateway::Session::save_shot_with_result)).

use async_trait::async_trait;
use serde::Serialize;

use crate::models::Shot;
use crate::types::MediaRef;

/// Maximum prompt length in characters accepted before calling a provider.
pub const MAX_PROMPT_LENGTH: usize = 2000;

/// A text-to-image request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    pub prompt: String,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

/// Typed failure of an image generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationError {
    /// The request was rejected before reaching the provider.
    #[error("Invalid generation request: {message}")]
    Validation { message: String },

    /// The provider could not be reached.
    #[error("Network error: {message}")]
    Network { message: String },

    /// The provider answered with an error.
    #[error("Provider error: {message}")]
    Provider {
        status: Option<u16>,
        message: String,
    },

    /// The provider answered successfully but returned no image.
    #[error("No image was returned by the provider")]
    EmptyResult,
}

impl GenerationError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::Network { .. } => "network",
            Self::Provider { .. } => "provider",
            Self::EmptyResult => "empty_result",
        }
    }
}

/// A remote text-to-image service.
///
/// Implementations must not touch the document; they only turn a prompt
/// into an opaque image reference.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<MediaRef, GenerationError>;
}

/// Generator used when no provider is configured. Always fails with a
/// provider error so saves degrade to "stored without image".
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredGenerator;

#[async_trait]
impl ImageGenerator for UnconfiguredGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<MediaRef, GenerationError> {
        Err(GenerationError::Provider {
            status: None,
            message: "image generation is not configured".to_string(),
        })
    }
}

/// Validate a prompt: non-blank and within [`MAX_PROMPT_LENGTH`].
pub fn validate_prompt(prompt: &str) -> Result<(), GenerationError> {
    if prompt.trim().is_empty() {
        return Err(GenerationError::Validation {
            message: "Shot description is required for image generation".to_string(),
        });
    }
    let len = prompt.chars().count();
    if len > MAX_PROMPT_LENGTH {
        return Err(GenerationError::Validation {
            message: format!("Prompt must not exceed {MAX_PROMPT_LENGTH} characters, got {len}"),
        });
    }
    Ok(())
}

/// Generate an image for a shot using its description as the prompt.
pub async fn generate_for_shot(
    generator: &dyn ImageGenerator,
    shot: &Shot,
) -> Result<MediaRef, GenerationError> {
    validate_prompt(&shot.description)?;
    generator
        .generate(&GenerationRequest::new(shot.description.clone()))
        .await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
