//! HTTP-level tests for the open-issues dashboard and the assistant routes.

mod common;

use axum::http::StatusCode;
use common::{expect_json, get_auth, post_json_auth, put_json_auth, TestApp};
use serde_json::{json, Value};

async fn branch(app: &TestApp, code: &str, name: &str) -> i64 {
    let body = json!({ "code": code, "name": name, "ip_address": "10.0.0.1" });
    let json = expect_json(
        post_json_auth(app.app(), "/api/v1/branches", body, &app.token).await,
        StatusCode::CREATED,
    )
    .await;
    json["data"]["id"].as_i64().expect("branch id")
}

async fn issue(app: &TestApp, body: Value) -> Value {
    let json = expect_json(
        post_json_auth(app.app(), "/api/v1/issues", body, &app.token).await,
        StatusCode::CREATED,
    )
    .await;
    json["data"].clone()
}

#[tokio::test]
async fn dashboard_shows_latest_open_issue_per_branch() {
    let app = common::build_test_app().await;
    let arusha = branch(&app, "1", "Arusha").await;
    let mwanza = branch(&app, "2", "Mwanza").await;
    branch(&app, "3", "Tanga").await;

    issue(
        &app,
        json!({ "branch_id": arusha, "description": "Old fault", "responsibility": "CRDB",
                "opened_at": "2026-01-01T08:00:00Z" }),
    )
    .await;
    issue(
        &app,
        json!({ "branch_id": arusha, "description": "New fault", "responsibility": "Zaoma",
                "opened_at": "2026-02-01T08:00:00Z" }),
    )
    .await;
    let resolved = issue(
        &app,
        json!({ "branch_id": mwanza, "description": "Fixed", "responsibility": "CRDB" }),
    )
    .await;
    put_json_auth(
        app.app(),
        &format!("/api/v1/issues/{}", resolved["id"]),
        json!({ "status": "Resolved" }),
        &app.token,
    )
    .await;

    let json = expect_json(
        get_auth(app.app(), "/api/v1/dashboard/open-issues", &app.token).await,
        StatusCode::OK,
    )
    .await;
    let rows = json["data"].as_array().expect("data array");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["branch"]["name"], "Arusha");
    assert_eq!(rows[0]["latest_open_issue"]["description"], "New fault");

    let json = expect_json(
        get_auth(app.app(), "/api/v1/dashboard/open-issues?assigned_to=crdb", &app.token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["data"], json!([]));
}

#[tokio::test]
async fn assistant_routes_are_503_without_model() {
    let app = common::build_test_app().await;
    let id = branch(&app, "1", "Arusha").await;

    let json = expect_json(
        post_json_auth(app.app(), "/api/v1/assistant/chat", json!({ "message": "hi" }), &app.token).await,
        StatusCode::SERVICE_UNAVAILABLE,
    )
    .await;
    assert_eq!(json["code"], "SERVICE_UNAVAILABLE");

    let response = post_json_auth(
        app.app(),
        &format!("/api/v1/branches/{id}/anomaly-summary"),
        json!({}),
        &app.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn assistant_chat_returns_model_reply() {
    let app = common::build_test_app_with_model("All branches are healthy.").await;

    let json = expect_json(
        post_json_auth(
            app.app(),
            "/api/v1/assistant/chat",
            json!({ "message": "How are the branches?" }),
            &app.token,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["data"]["reply"], "All branches are healthy.");
}

#[tokio::test]
async fn anomaly_summary_for_known_branch() {
    let app = common::build_test_app_with_model("No recurring faults.").await;
    let id = branch(&app, "9", "Dodoma").await;

    let json = expect_json(
        post_json_auth(
            app.app(),
            &format!("/api/v1/branches/{id}/anomaly-summary"),
            json!({ "system_performance_metrics": "cpu 40%" }),
            &app.token,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["data"]["summary"], "No recurring faults.");

    let response = post_json_auth(
        app.app(),
        "/api/v1/branches/4242/anomaly-summary",
        json!({}),
        &app.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
