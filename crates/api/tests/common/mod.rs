#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use storymaker_api::config::ServerConfig;
use storymaker_api::router::build_app_router;
use storymaker_api::state::AppState;
use storymaker_core::generation::{GenerationError, GenerationRequest, ImageGenerator};
use storymaker_core::types::MediaRef;

/// Image returned by [`StubGenerator`] for ordinary prompts.
pub const STUB_IMAGE: &str = "data:image/png;base64,c3R1Yg==";

/// Generator whose outcome is chosen by keywords in the prompt:
/// `network`, `provider` or `empty` fail accordingly; anything else
/// succeeds with [`STUB_IMAGE`].
pub struct StubGenerator;

#[async_trait]
impl ImageGenerator for StubGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<MediaRef, GenerationError> {
        let prompt = request.prompt.to_lowercase();
        if prompt.contains("network") {
            Err(GenerationError::Network {
                message: "connection reset by peer".into(),
            })
        } else if prompt.contains("provider") {
            Err(GenerationError::Provider {
                status: Some(401),
                message: "Missing API key".into(),
            })
        } else if prompt.contains("empty") {
            Err(GenerationError::EmptyResult)
        } else {
            Ok(MediaRef::new(STUB_IMAGE))
        }
    }
}

/// Test `ServerConfig` with local defaults and generation disabled.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        generation_timeout_secs: 20,
        stability: None,
    }
}

/// Build the production router over a fresh session using [`StubGenerator`].
///
/// The returned router shares one session across clones, so a test can
/// send several requests with `app.clone()`.
pub fn build_test_app() -> Router {
    let config = test_config();
    let state = AppState::new(config.clone(), Arc::new(StubGenerator));
    build_app_router(state, &config)
}

/// Build the production router with a custom config and generator.
pub fn build_test_app_with(config: ServerConfig, generator: Arc<dyn ImageGenerator>) -> Router {
    let state = AppState::new(config.clone(), generator);
    build_app_router(state, &config)
}

/// Like [`build_test_app`] but also returns the state for direct inspection.
pub fn build_test_app_with_state() -> (Router, AppState) {
    let config = test_config();
    let state = AppState::new(config.clone(), Arc::new(StubGenerator));
    (build_app_router(state.clone(), &config), state)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: &Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

/// POST without a body.
pub async fn post(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None).await
}

/// Collect the response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// `GET /api/v1/state` and return its `data`.
pub async fn state(app: &Router) -> serde_json::Value {
    body_json(get(app, "/api/v1/state").await).await["data"].clone()
}

/// Create a shot and return its id.
pub async fn create_shot(app: &Router, body: serde_json::Value) -> String {
    let json = body_json(post_json(app, "/api/v1/shots", body).await).await;
    json["data"]["outcome"]["id"].as_str().unwrap().to_string()
}

/// Create a character and return its id.
pub async fn create_character(app: &Router, name: &str) -> String {
    let json = body_json(
        post_json(app, "/api/v1/characters", serde_json::json!({ "name": name })).await,
    )
    .await;
    json["data"]["outcome"]["id"].as_str().unwrap().to_string()
}

/// Names of the shots in sequence order.
pub async fn shot_names(app: &Router) -> Vec<String> {
    let json = body_json(get(app, "/api/v1/shots").await).await;
    json["data"]["shots"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap().to_string())
        .collect()
}
