//! Provider connection settings and fixed generation parameters.

use std::time::Duration;

use serde::Serialize;

pub const DEFAULT_API_URL: &str = "https://api.stability.ai";
pub const DEFAULT_ENGINE: &str = "stable-diffusion-xl-1024-v1-0";

/// Whole-call deadline for one text-to-image request.
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Sampling parameters sent with every text-to-image request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationParams {
    pub cfg_scale: f32,
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub samples: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            cfg_scale: 7.0,
            width: 1024,
            height: 1024,
            steps: 30,
            samples: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StabilityConfig {
    /// Base URL without trailing slash, e.g. `https://api.stability.ai`.
    pub api_url: String,
    pub api_key: String,
    pub engine: String,
    pub params: GenerationParams,
    /// Applied to the whole request, connect through body.
    pub timeout: Duration,
}

impl StabilityConfig {
    /// Config for the public endpoint and default engine.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: api_key.into(),
            engine: DEFAULT_ENGINE.to_string(),
            params: GenerationParams::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = engine.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `POST` target for text-to-image generation.
    pub fn text_to_image_url(&self) -> String {
        format!(
            "{}/v1/generation/{}/text-to-image",
            self.api_url, self.engine
        )
    }
}
