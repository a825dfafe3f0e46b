//! REST client for the text-to-image endpoint.
//!
//! Transport failures map to [`GenerationError::Network`], non-2xx answers
//! to [`GenerationError::Provider`] and a success without artifacts to
//! [`GenerationError::EmptyResult`].

use async_trait::async_trait;
use serde::Deserialize;
use storymaker_core::generation::{GenerationError, GenerationRequest, ImageGenerator};
use storymaker_core::types::MediaRef;

use crate::config::{GenerationParams, StabilityConfig};

/// Prefix of the image reference built from a base64 artifact.
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// HTTP client for a single provider account.
pub struct StabilityClient {
    client: reqwest::Client,
    config: StabilityConfig,
}

/// Successful text-to-image response body.
#[derive(Debug, Deserialize)]
pub struct TextToImageResponse {
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
}

#[derive(Debug, Deserialize)]
pub struct Artifact {
    pub base64: String,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default, rename = "finishReason")]
    pub finish_reason: Option<String>,
}

/// Errors from the REST layer, before they are folded into
/// [`GenerationError`].
#[derive(Debug, thiserror::Error)]
pub enum StabilityApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Stability API error ({status}): {body}")]
    ApiError { status: u16, body: String },
}

impl From<StabilityApiError> for GenerationError {
    fn from(err: StabilityApiError) -> Self {
        match err {
            StabilityApiError::Request(e) if e.is_decode() => GenerationError::Provider {
                status: e.status().map(|s| s.as_u16()),
                message: format!("Unreadable response: {e}"),
            },
            StabilityApiError::Request(e) => GenerationError::Network {
                message: e.to_string(),
            },
            StabilityApiError::ApiError { status, body } => GenerationError::Provider {
                status: Some(status),
                message: provider_message(status, &body),
            },
        }
    }
}

impl StabilityClient {
    /// Build a client whose requests give up after `config.timeout`.
    ///
    /// A timed-out call surfaces as [`GenerationError::Network`].
    pub fn new(config: StabilityConfig) -> Result<Self, StabilityApiError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &StabilityConfig {
        &self.config
    }

    /// Call the text-to-image endpoint and return the parsed body.
    pub async fn text_to_image(
        &self,
        prompt: &str,
    ) -> Result<TextToImageResponse, StabilityApiError> {
        let response = self
            .client
            .post(self.config.text_to_image_url())
            .bearer_auth(&self.config.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&build_request_body(prompt, &self.config.params))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, StabilityApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(StabilityApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, StabilityApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl ImageGenerator for StabilityClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<MediaRef, GenerationError> {
        tracing::debug!(
            engine = %self.config.engine,
            prompt_len = request.prompt.len(),
            "Requesting text-to-image generation"
        );
        let response = self.text_to_image(&request.prompt).await.map_err(|e| {
            let err = GenerationError::from(e);
            tracing::warn!(kind = err.kind(), error = %err, "Image generation failed");
            err
        })?;
        first_image(response)
    }
}

/// JSON body for a text-to-image call.
pub fn build_request_body(prompt: &str, params: &GenerationParams) -> serde_json::Value {
    serde_json::json!({
        "text_prompts": [{ "text": prompt }],
        "cfg_scale": params.cfg_scale,
        "height": params.height,
        "width": params.width,
        "steps": params.steps,
        "samples": params.samples,
    })
}

/// Turn the first artifact into a PNG data URL.
pub fn first_image(response: TextToImageResponse) -> Result<MediaRef, GenerationError> {
    let artifact = response
        .artifacts
        .into_iter()
        .find(|a| !a.base64.is_empty())
        .ok_or(GenerationError::EmptyResult)?;
    Ok(MediaRef::new(format!("{PNG_DATA_URL_PREFIX}{}", artifact.base64)))
}

/// Human-readable message for a failed call: the body's `message` field
/// when present, otherwise the status reason phrase.
pub fn provider_message(status: u16, body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("Unknown error")
                .to_string()
        })
}
