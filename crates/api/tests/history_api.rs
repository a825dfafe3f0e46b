//! HTTP-level tests for snapshot history.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post, post_json};
use serde_json::json;

#[tokio::test]
async fn snapshot_round_trip_restores_document() {
    let app = common::build_test_app();
    post_json(&app, "/api/v1/versions", json!({ "text": "draft 1" })).await;
    post_json(&app, "/api/v1/scenes", json!({ "tag": "INT. LAB" })).await;
    common::create_shot(&app, json!({ "name": "S1" })).await;
    let before = common::state(&app).await["document"].clone();

    let response = post_json(&app, "/api/v1/snapshots", json!({ "label": "act one" })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["outcome"]["index"], 0);

    common::create_shot(&app, json!({ "name": "S2" })).await;
    post_json(&app, "/api/v1/versions", json!({ "text": "draft 2" })).await;
    assert_ne!(common::state(&app).await["document"], before);

    let response = post(&app, "/api/v1/snapshots/0/navigate").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["outcome"]["moved"], true);
    assert_eq!(json["data"]["outcome"]["cursor"], 0);

    assert_eq!(common::state(&app).await["document"], before);
}

#[tokio::test]
async fn navigate_out_of_range_is_ignored() {
    let app = common::build_test_app();
    post_json(&app, "/api/v1/snapshots", json!({})).await;
    common::create_shot(&app, json!({ "name": "S1" })).await;

    for index in ["-1", "1", "42"] {
        let response = post(&app, &format!("/api/v1/snapshots/{index}/navigate")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["outcome"]["moved"], false);
        assert_eq!(json["data"]["outcome"]["cursor"], 0);
    }

    assert_eq!(common::state(&app).await["shot_count"], 1);
}

#[tokio::test]
async fn step_back_and_forward() {
    let app = common::build_test_app();
    post_json(&app, "/api/v1/snapshots", json!({})).await;
    common::create_shot(&app, json!({ "name": "S1" })).await;
    post_json(&app, "/api/v1/snapshots", json!({ "label": "with shot" })).await;

    let response = post_json(&app, "/api/v1/snapshots/step", json!({ "direction": "back" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let state = common::state(&app).await;
    assert_eq!(state["shot_count"], 0);
    assert_eq!(state["snapshot_cursor"], 0);
    assert_eq!(state["can_step_back"], false);
    assert_eq!(state["can_step_forward"], true);

    post_json(&app, "/api/v1/snapshots/step", json!({ "direction": "forward" })).await;
    assert_eq!(common::state(&app).await["shot_count"], 1);

    let json = body_json(get(&app, "/api/v1/snapshots").await).await;
    assert_eq!(json["data"]["cursor"], 1);
    assert_eq!(json["data"]["snapshots"][1]["label"], "with shot");
    assert_eq!(json["data"]["snapshots"][1]["shot_count"], 1);
}

#[tokio::test]
async fn blank_label_is_rejected() {
    let app = common::build_test_app();
    let response = post_json(&app, "/api/v1/snapshots", json!({ "label": " " })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(get(&app, "/api/v1/snapshots").await).await;
    assert_eq!(json["data"]["cursor"], -1);
}
