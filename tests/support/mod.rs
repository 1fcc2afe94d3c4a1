#![allow(dead_code)]

use std::sync::Arc;

use arbeit_auth::config::{CookieConfig, CorsConfig, ServerConfig};
use arbeit_auth::{build_app, AppState, AuthConfig, MemoryStore};
use axum::body::Body;
use axum::http::{
    header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
    Method, Request, StatusCode,
};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::util::ServiceExt;

pub const SECRET: &str = "test-secret-that-is-at-least-32-bytes-long";

pub fn test_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: SECRET.to_string(),
        jwt_issuer: "arbeit".to_string(),
        jwt_audience: "arbeit-api".to_string(),
        access_token_ttl: 1800,
        // cheap parameters keep the suite fast
        argon2_memory_cost: 1024,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
        min_password_length: 8,
        cookie: CookieConfig::default(),
        cors: CorsConfig::default(),
        server: ServerConfig::default(),
    }
}

pub fn test_state() -> AppState {
    AppState::new(test_config(), Arc::new(MemoryStore::new())).expect("test state")
}

/// Application with the given downstream platform routes
pub fn test_app(state: AppState, downstream: Router<AppState>) -> Router {
    build_app(state, downstream)
}

pub fn json_request(method: Method, uri: &str, body: Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = cookie {
        builder = builder.header(COOKIE, format!("accessToken={token}"));
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub fn empty_request(method: Method, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = cookie {
        builder = builder.header(COOKIE, format!("accessToken={token}"));
    }
    builder.body(Body::empty()).expect("request")
}

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.expect("infallible router")
}

pub async fn body_text(response: Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).expect("json body")
}

/// Full `Set-Cookie` header for the session cookie
pub fn session_set_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("accessToken="))
        .map(str::to_string)
}

/// Token value carried by the session `Set-Cookie` header
pub fn session_token(response: &Response) -> Option<String> {
    let header = session_set_cookie(response)?;
    let pair = header.split(';').next()?;
    pair.strip_prefix("accessToken=").map(str::to_string)
}

/// Register a user through the API and return the session token of a fresh login
pub async fn register_and_login(app: &Router, email: &str, password: &str) -> String {
    let register = send(
        app,
        json_request(
            Method::POST,
            "/auth/register",
            serde_json::json!({ "email": email, "password": password }),
            None,
        ),
    )
    .await;
    assert_eq!(register.status(), StatusCode::CREATED);

    let login = send(
        app,
        json_request(
            Method::POST,
            "/auth/login",
            serde_json::json!({ "email": email, "password": password }),
            None,
        ),
    )
    .await;
    assert_eq!(login.status(), StatusCode::OK);
    session_token(&login).expect("session cookie")
}

/// Register a business through the API and return the session token of a fresh login
pub async fn register_and_login_business(app: &Router, email: &str, password: &str) -> String {
    let register = send(
        app,
        json_request(
            Method::POST,
            "/auth/business/register",
            serde_json::json!({
                "name": "Ada Lovelace",
                "email": email,
                "password": password,
                "companyName": "Analytical Engines Ltd"
            }),
            None,
        ),
    )
    .await;
    assert_eq!(register.status(), StatusCode::CREATED);

    let login = send(
        app,
        json_request(
            Method::POST,
            "/auth/business/login",
            serde_json::json!({ "email": email, "password": password }),
            None,
        ),
    )
    .await;
    assert_eq!(login.status(), StatusCode::OK);
    session_token(&login).expect("session cookie")
}
