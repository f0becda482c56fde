//! Router assembly and request handlers.
//!
//! The widget endpoints live under `/api/auth` and are tenant-scoped
//! by the `X-API-Key` header. The project endpoints under
//! `/api/projects` are the dashboard surface and carry no tenant
//! header; deployments are expected to bind them behind their own
//! perimeter.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderName, Method, StatusCode, header};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use embedauth_auth::service::NewProject;
use embedauth_auth::{AuthGateway, AuthSuccess, CredentialsInput};
use embedauth_core::models::project::{Project, ProjectSummary, UpdateProject};
use embedauth_db::repository::{
    SurrealProjectRepository, SurrealSessionRepository, SurrealUserRepository,
};
use serde_json::{Value, json};
use surrealdb::Connection;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::error::ApiError;

/// The gateway wired to the SurrealDB repositories.
pub type Gateway<C> =
    AuthGateway<SurrealProjectRepository<C>, SurrealUserRepository<C>, SurrealSessionRepository<C>>;

pub type AppState<C> = Arc<Gateway<C>>;

/// Build the gateway over a single database client.
pub fn build_gateway<C: Connection>(
    db: surrealdb::Surreal<C>,
    config: embedauth_auth::AuthConfig,
) -> Gateway<C> {
    AuthGateway::new(
        SurrealProjectRepository::new(db.clone()),
        SurrealUserRepository::new(db.clone()),
        SurrealSessionRepository::new(db),
        config,
    )
}

pub fn create_router<C: Connection>(state: AppState<C>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-api-key"),
        ]);

    Router::new()
        .route("/health", get(health))
        .route("/api/auth/register", post(register::<C>))
        .route("/api/auth/login", post(login::<C>))
        .route("/api/auth/me", get(me::<C>))
        .route("/api/projects", post(create_project::<C>).get(list_projects::<C>))
        .route(
            "/api/projects/{id}",
            axum::routing::patch(update_project::<C>).delete(delete_project::<C>),
        )
        .route(
            "/api/projects/{id}/sessions",
            axum::routing::delete(cleanup_sessions::<C>),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// `X-API-Key` value, if present and readable.
fn api_key(headers: &HeaderMap) -> Option<&str> {
    headers.get("x-api-key").and_then(|v| v.to_str().ok())
}

/// Browser `Origin` header; non-browser callers send none and are
/// treated as unrestricted.
fn request_origin(headers: &HeaderMap) -> &str {
    headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(embedauth_auth::origin::WILDCARD_ORIGIN)
}

/// Bearer token from the `Authorization` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn register<C: Connection>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    Json(input): Json<CredentialsInput>,
) -> Result<(StatusCode, Json<AuthSuccess>), ApiError> {
    let success = state
        .register(api_key(&headers), request_origin(&headers), input)
        .await?;
    Ok((StatusCode::CREATED, Json(success)))
}

async fn login<C: Connection>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    Json(input): Json<CredentialsInput>,
) -> Result<Json<AuthSuccess>, ApiError> {
    let success = state
        .login(api_key(&headers), request_origin(&headers), input)
        .await?;
    Ok(Json(success))
}

async fn me<C: Connection>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let user = state
        .current_user(api_key(&headers), bearer_token(&headers))
        .await?;
    // Wrapped in a `user` envelope, matching register/login's
    // {user, token, expires_at} shape.
    Ok(Json(json!({ "user": user })))
}

async fn create_project<C: Connection>(
    State(state): State<AppState<C>>,
    Json(input): Json<NewProject>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    let project = state.create_project(input).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

async fn list_projects<C: Connection>(
    State(state): State<AppState<C>>,
) -> Result<Json<Vec<ProjectSummary>>, ApiError> {
    Ok(Json(state.list_projects().await?))
}

async fn update_project<C: Connection>(
    State(state): State<AppState<C>>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateProject>,
) -> Result<Json<Project>, ApiError> {
    Ok(Json(state.update_project(id, input).await?))
}

async fn delete_project<C: Connection>(
    State(state): State<AppState<C>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.delete_project(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Expired-session housekeeping; live sessions are untouched.
async fn cleanup_sessions<C: Connection>(
    State(state): State<AppState<C>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let removed = state.cleanup_expired_sessions(id).await?;
    Ok(Json(json!({ "removed": removed })))
}
