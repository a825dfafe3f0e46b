//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no router needed.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use storymaker_api::error::AppError;
use storymaker_core::error::CoreError;
use storymaker_core::generation::GenerationError;

async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::not_found("Shot", "abc"));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Shot with id abc not found");
}

#[tokio::test]
async fn validation_error_returns_400() {
    let err = AppError::Core(CoreError::Validation("to_index 5 is out of range".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "to_index 5 is out of range");
}

#[tokio::test]
async fn conflict_error_returns_409() {
    let err = AppError::Core(CoreError::Conflict("Scene 'INT. LAB' already exists".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
}

#[tokio::test]
async fn bad_request_error_returns_400() {
    let err = AppError::BadRequest("invalid field value".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "invalid field value");
}

#[tokio::test]
async fn internal_errors_are_sanitized() {
    let err = AppError::InternalError("Diff task failed: task 12 panicked".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[test]
fn parts_expose_code_for_non_http_replies() {
    let (status, code, message) =
        AppError::Core(CoreError::not_found("Shot", "abc")).parts();
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(code, "NOT_FOUND");
    assert_eq!(message, "Shot with id abc not found");
}

#[tokio::test]
async fn generation_failures_map_to_bad_gateway() {
    let cases = [
        (
            GenerationError::Network {
                message: "connection refused".into(),
            },
            "GENERATION_NETWORK_ERROR",
        ),
        (
            GenerationError::Provider {
                status: Some(401),
                message: "Missing API key".into(),
            },
            "GENERATION_PROVIDER_ERROR",
        ),
        (GenerationError::EmptyResult, "GENERATION_EMPTY_RESULT"),
    ];

    for (err, code) in cases {
        let (status, json) = error_to_response(AppError::Generation(err)).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["code"], code);
    }
}

#[tokio::test]
async fn generation_validation_returns_400() {
    let err = AppError::Generation(GenerationError::Validation {
        message: "Shot description is required for image generation".into(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "Shot description is required for image generation");
}
