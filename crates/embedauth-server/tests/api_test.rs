//! End-to-end tests for the HTTP surface, driven through the router
//! with an in-memory database behind it.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use embedauth_auth::AuthConfig;
use embedauth_server::app::{build_gateway, create_router};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use tower::ServiceExt;

async fn test_app() -> Router {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    embedauth_db::run_migrations(&db).await.unwrap();
    create_router(Arc::new(build_gateway(db, AuthConfig::default())))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn auth_post(uri: &str, api_key: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-api-key", api_key)
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Create a project through the admin surface, returning its API key
/// and id.
async fn seed_project(app: &Router, origins: Value) -> (String, String) {
    let (status, body) = send(
        app,
        post_json(
            "/api/projects",
            json!({ "name": "Test", "allowed_origins": origins }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    (
        body["api_key"].as_str().unwrap().to_string(),
        body["id"].as_str().unwrap().to_string(),
    )
}

fn credentials(email: &str, password: &str) -> Value {
    json!({ "email": email, "password": password })
}

#[tokio::test]
async fn health_endpoint() {
    let app = test_app().await;
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn register_returns_created_with_token() {
    let app = test_app().await;
    let (api_key, _) = seed_project(&app, json!([])).await;

    let (status, body) = send(
        &app,
        auth_post(
            "/api/auth/register",
            &api_key,
            credentials("New@User.test", "long-enough-pw"),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "new@user.test");
    assert_eq!(body["token"].as_str().unwrap().len(), 64);
    assert!(body["expires_at"].is_string());
    // The password hash never leaves the server.
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn register_without_api_key() {
    let app = test_app().await;
    seed_project(&app, json!([])).await;

    let (status, body) = send(
        &app,
        post_json("/api/auth/register", credentials("a@b.test", "long-enough-pw")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "API key required");
}

#[tokio::test]
async fn register_with_unknown_api_key() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        auth_post(
            "/api/auth/register",
            "ea_unknown",
            credentials("a@b.test", "long-enough-pw"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid API key");
}

#[tokio::test]
async fn register_validation_errors() {
    let app = test_app().await;
    let (api_key, _) = seed_project(&app, json!([])).await;

    let (status, body) = send(
        &app,
        auth_post("/api/auth/register", &api_key, credentials("a@b.test", "short")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Password must be at least 8 characters");

    let (status, body) = send(
        &app,
        auth_post("/api/auth/register", &api_key, credentials("", "long-enough-pw")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email and password required");
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = test_app().await;
    let (api_key, _) = seed_project(&app, json!([])).await;

    let creds = credentials("dup@b.test", "long-enough-pw");
    let (status, _) = send(&app, auth_post("/api/auth/register", &api_key, creds.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, auth_post("/api/auth/register", &api_key, creds)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "User already exists");
}

#[tokio::test]
async fn login_round_trip() {
    let app = test_app().await;
    let (api_key, _) = seed_project(&app, json!([])).await;

    send(
        &app,
        auth_post(
            "/api/auth/register",
            &api_key,
            credentials("log@in.test", "long-enough-pw"),
        ),
    )
    .await;

    let (status, body) = send(
        &app,
        auth_post(
            "/api/auth/login",
            &api_key,
            credentials("log@in.test", "long-enough-pw"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "log@in.test");

    let (status, body) = send(
        &app,
        auth_post(
            "/api/auth/login",
            &api_key,
            credentials("log@in.test", "wrong-password"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn origin_restriction_enforced() {
    let app = test_app().await;
    let (api_key, _) = seed_project(&app, json!(["https://allowed.test"])).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-api-key", &api_key)
        .header(header::ORIGIN, "https://other.test")
        .body(Body::from(
            credentials("o@b.test", "long-enough-pw").to_string(),
        ))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Origin not allowed");

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-api-key", &api_key)
        .header(header::ORIGIN, "https://allowed.test")
        .body(Body::from(
            credentials("o@b.test", "long-enough-pw").to_string(),
        ))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn me_resolves_bearer_token() {
    let app = test_app().await;
    let (api_key, _) = seed_project(&app, json!([])).await;

    let (_, body) = send(
        &app,
        auth_post(
            "/api/auth/register",
            &api_key,
            credentials("me@b.test", "long-enough-pw"),
        ),
    )
    .await;
    let token = body["token"].as_str().unwrap().to_string();

    let request = Request::builder()
        .uri("/api/auth/me")
        .header("x-api-key", &api_key)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    // The payload sits in a `user` envelope, like register/login.
    assert_eq!(body["user"]["email"], "me@b.test");
    assert!(body["user"]["id"].is_string());

    // Unknown token and missing header read the same.
    let request = Request::builder()
        .uri("/api/auth/me")
        .header("x-api-key", &api_key)
        .header(header::AUTHORIZATION, "Bearer deadbeef")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid or expired session");

    let request = Request::builder()
        .uri("/api/auth/me")
        .header("x-api-key", &api_key)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid or expired session");
}

#[tokio::test]
async fn project_admin_lifecycle() {
    let app = test_app().await;
    let (api_key, id) = seed_project(&app, json!([])).await;
    assert!(api_key.starts_with("ea_"));

    send(
        &app,
        auth_post(
            "/api/auth/register",
            &api_key,
            credentials("count@b.test", "long-enough-pw"),
        ),
    )
    .await;

    let request = Request::builder()
        .uri("/api/projects")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    let listing = body.as_array().unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0]["user_count"], 1);
    assert_eq!(listing[0]["active_session_count"], 1);

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/projects/{id}/sessions"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    // The session just issued is live, so nothing is purged.
    assert_eq!(body["removed"], 0);

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/projects/{}/sessions", uuid::Uuid::new_v4()))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Project not found");

    let request = Request::builder()
        .method("PATCH")
        .uri(format!("/api/projects/{id}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "theme": "light" }).to_string()))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["theme"], "light");

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/projects/{id}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Gone now.
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/projects/{id}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Project not found");
}

#[tokio::test]
async fn create_project_requires_name() {
    let app = test_app().await;
    let (status, body) = send(&app, post_json("/api/projects", json!({ "name": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Project name required");
}
