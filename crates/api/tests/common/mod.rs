#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sentry_assistant::{Assistant, AssistantError, GenerateRequest, LanguageModel, ModelResponse};
use sentry_db::models::user::{NewUser, User};
use sentry_db::{MemoryStore, Store, UserStore};
use sentry_events::RecordingSender;
use serde_json::Value;
use tower::ServiceExt;

use sentry_api::auth::jwt::generate_access_token;
use sentry_api::auth::password::hash_password;
use sentry_api::config::ServerConfig;
use sentry_api::router::build_app_router;
use sentry_api::state::AppState;

pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Build a test `ServerConfig` against the in-memory store.
pub fn test_config() -> ServerConfig {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("STORE_BACKEND", "memory"),
        ("JWT_SECRET", "test-secret-that-is-long-enough"),
        ("HOST", "127.0.0.1"),
        ("PORT", "0"),
        ("REPORT_SCHEDULER_ENABLED", "false"),
    ]);
    ServerConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
        .expect("test config should load")
}

/// A running application plus handles on its fakes.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub sender: Arc<RecordingSender>,
    pub user: User,
    pub token: String,
}

impl TestApp {
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full application router with the same middleware stack
/// production uses, with no assistant configured.
pub async fn build_test_app() -> TestApp {
    build_test_app_with(None).await
}

/// Same as [`build_test_app`], backed by a model that always answers `reply`.
pub async fn build_test_app_with_model(reply: &str) -> TestApp {
    build_test_app_with(Some(Arc::new(FixedModel(reply.to_string())))).await
}

/// Same as [`build_test_app`], with a caller-supplied configuration.
pub async fn build_test_app_with_config(config: ServerConfig) -> TestApp {
    build_app(config, None).await
}

async fn build_test_app_with(model: Option<Arc<dyn LanguageModel>>) -> TestApp {
    build_app(test_config(), model).await
}

async fn build_app(config: ServerConfig, model: Option<Arc<dyn LanguageModel>>) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let sender = Arc::new(RecordingSender::new());

    let user = store
        .create_user(&NewUser {
            email: "ops@example.com".to_string(),
            display_name: "Ops".to_string(),
            password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
            role: "admin".to_string(),
        })
        .await
        .expect("user creation should succeed");
    let token = generate_access_token(user.id, &user.role, &config.jwt)
        .expect("token generation should succeed");

    let store_dyn: Arc<dyn Store> = store.clone();
    let assistant = model.map(|m| Arc::new(Assistant::new(m, Arc::clone(&store_dyn))));
    let state = AppState::new(store_dyn, sender.clone(), assistant, config.clone());
    let router = build_app_router(state, &config);

    TestApp {
        router,
        store,
        sender,
        user,
        token,
    }
}

/// A model that never calls tools.
struct FixedModel(String);

#[async_trait]
impl LanguageModel for FixedModel {
    async fn generate(&self, _request: &GenerateRequest) -> Result<ModelResponse, AssistantError> {
        Ok(ModelResponse {
            text: self.0.clone(),
            tool_calls: Vec::new(),
        })
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("router should not fail")
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).expect("request should build")
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, request(Method::GET, uri, None, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, request(Method::GET, uri, Some(token), None)).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, request(Method::POST, uri, None, Some(body))).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, request(Method::POST, uri, Some(token), Some(body))).await
}

pub async fn post_raw(app: Router, uri: &str, raw: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(raw.to_string()))
        .expect("request should build");
    send(app, request).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, request(Method::PUT, uri, Some(token), Some(body))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, request(Method::DELETE, uri, Some(token), None)).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// Assert the status and return the parsed body.
pub async fn expect_json(response: Response, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}
