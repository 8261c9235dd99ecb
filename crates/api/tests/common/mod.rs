//! Shared helpers for API integration tests.
//!
//! Builds the full application router with the production middleware stack
//! so tests exercise exactly what `main.rs` serves.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use vidnote_api::auth::jwt::{generate_access_token, JwtConfig};
use vidnote_api::config::ServerConfig;
use vidnote_api::router::build_app_router;
use vidnote_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// Mint a Bearer token for the given user id with the test secret.
pub fn bearer(user_id: i64) -> String {
    let token = generate_access_token(user_id, "reviewer", &test_config().jwt)
        .expect("token generation");
    format!("Bearer {token}")
}

/// Issue a JSON request against the app and return status plus parsed body.
pub async fn request(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<i64>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user_id) = user {
        builder = builder.header("authorization", bearer(user_id));
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}
