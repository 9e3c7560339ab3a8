//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, get_auth};

#[tokio::test]
async fn health_check_reports_store_status() {
    let app = common::build_test_app().await;

    let json = common::expect_json(get(app.app(), "/health").await, StatusCode::OK).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["store_healthy"], true);

    app.store.set_unavailable(true);
    let json = body_json(get(app.app(), "/health").await).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["store_healthy"], false);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = common::build_test_app().await;
    let response = get(app.app(), "/this-route-does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = common::build_test_app().await;
    let response = get(app.app(), "/health").await;
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn store_outage_is_sanitized_500() {
    let app = common::build_test_app().await;
    app.store.set_unavailable(true);

    let response = get_auth(app.app(), "/api/v1/branches", &app.token).await;
    let json = common::expect_json(response, StatusCode::INTERNAL_SERVER_ERROR).await;
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}
