use std::time::Duration;

use storymaker_imagegen::config::{DEFAULT_API_URL, DEFAULT_ENGINE, DEFAULT_TIMEOUT_SECS};
use storymaker_imagegen::StabilityConfig;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("GENERATION_TIMEOUT_SECS ({generation}) must be below REQUEST_TIMEOUT_SECS ({request})")]
    GenerationTimeoutTooLong { generation: u64, request: u64 },
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Time allowed for background tasks to drain on shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Deadline for one image provider call (default: `20`). Kept below the
    /// request timeout so a save-with-generation answers in time.
    pub generation_timeout_secs: u64,
    /// Image provider settings. `None` disables generation.
    pub stability: Option<StabilityConfig>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                           |
    /// |------------------------|-----------------------------------|
    /// | `HOST`                 | `0.0.0.0`                         |
    /// | `PORT`                 | `3000`                            |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`           |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                              |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                              |
    /// | `GENERATION_TIMEOUT_SECS` | `20`                           |
    /// | `STABILITY_API_KEY`    | unset (generation disabled)       |
    /// | `STABILITY_API_URL`    | `https://api.stability.ai`        |
    /// | `STABILITY_ENGINE`     | `stable-diffusion-xl-1024-v1-0`   |
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env_or("HOST", "0.0.0.0");
        let port = parse_env("PORT", "3000", "u16")?;

        let cors_origins = parse_origins(&env_or("CORS_ORIGINS", "http://localhost:5173"));

        let request_timeout_secs = parse_env("REQUEST_TIMEOUT_SECS", "30", "u64")?;
        let shutdown_timeout_secs = parse_env("SHUTDOWN_TIMEOUT_SECS", "30", "u64")?;
        let generation_timeout_secs = parse_env(
            "GENERATION_TIMEOUT_SECS",
            &DEFAULT_TIMEOUT_SECS.to_string(),
            "u64",
        )?;
        check_generation_timeout(generation_timeout_secs, request_timeout_secs)?;

        let stability = std::env::var("STABILITY_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(|key| {
                StabilityConfig::new(key.trim())
                    .with_api_url(env_or("STABILITY_API_URL", DEFAULT_API_URL))
                    .with_engine(env_or("STABILITY_ENGINE", DEFAULT_ENGINE))
                    .with_timeout(Duration::from_secs(generation_timeout_secs))
            });

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            generation_timeout_secs,
            stability,
        })
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }
}

/// The provider deadline must expire before the HTTP request deadline.
pub fn check_generation_timeout(generation: u64, request: u64) -> Result<(), ConfigError> {
    if generation >= request {
        return Err(ConfigError::GenerationTimeoutTooLong {
            generation,
            request,
        });
    }
    Ok(())
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.into())
}

fn parse_env<T: std::str::FromStr>(
    name: &'static str,
    default: &str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    let value = env_or(name, default);
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        expected,
        value,
    })
}

/// Split a comma-separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
