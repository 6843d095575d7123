#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use sensordash_api::auth::jwt::{generate_access_token, JwtConfig};
use sensordash_api::config::ServerConfig;
use sensordash_api::metrics::{MetricsClient, MetricsConfig};
use sensordash_api::router::build_app_router;
use sensordash_api::state::AppState;

pub const TEST_ORG: i64 = 1;
pub const OTHER_ORG: i64 = 2;

/// Build a test `ServerConfig` with safe defaults and no metrics endpoint.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3001".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        editors_can_admin: false,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
        metrics: MetricsConfig {
            query_url: None,
            datasource_id: 1,
            datasource_org_id: 1,
            bucket: "sensors".to_string(),
            organization: "test-org".to_string(),
        },
    }
}

/// Build the full application router, with the production middleware
/// stack, using the default test configuration.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_config(pool, test_config())
}

pub fn build_test_app_with_config(pool: PgPool, config: ServerConfig) -> Router {
    let metrics = MetricsClient::new(config.metrics.clone()).unwrap();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        metrics: Arc::new(metrics),
    };
    build_app_router(state, &config)
}

/// Issue a bearer token signed with the test secret.
pub fn token(user_id: i64, org_id: i64, role: &str) -> String {
    generate_access_token(user_id, org_id, role, &test_config().jwt).unwrap()
}

pub fn admin_token() -> String {
    token(1, TEST_ORG, "admin")
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

/// Unauthenticated GET.
pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, token: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, token: &str, body: serde_json::Value) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

/// POST a raw, possibly malformed, JSON body.
pub async fn post_raw_json(app: Router, uri: &str, token: &str, body: &'static str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn delete(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a device in `TEST_ORG` as admin and return its id.
pub async fn create_device(pool: &PgPool, body: serde_json::Value) -> i64 {
    let app = build_test_app(pool.clone());
    let response = post_json(app, "/api/devices", &admin_token(), body).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}
