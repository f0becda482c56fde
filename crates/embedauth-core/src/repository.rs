//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. User- and session-scoped
//! operations take a `project_id` to enforce tenant isolation; the
//! two exceptions (`get_by_api_key`, `get_valid_by_token`) are the
//! tenant-selection lookups themselves.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::CoreResult;
use crate::models::{
    project::{CreateProject, Project, ProjectSummary, UpdateProject},
    session::{CreateSession, Session},
    user::{CreateUser, User},
};

pub trait ProjectRepository: Send + Sync {
    fn create(&self, input: CreateProject) -> impl Future<Output = CoreResult<Project>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = CoreResult<Project>> + Send;
    /// Tenant resolution: the only lookup keyed by the secret.
    fn get_by_api_key(&self, api_key: &str) -> impl Future<Output = CoreResult<Project>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateProject,
    ) -> impl Future<Output = CoreResult<Project>> + Send;
    /// Deletes the project and cascades to its users and sessions.
    fn delete(&self, id: Uuid) -> impl Future<Output = CoreResult<()>> + Send;
    /// Admin listing with per-project user and live-session counts.
    fn list(&self) -> impl Future<Output = CoreResult<Vec<ProjectSummary>>> + Send;
}

pub trait UserRepository: Send + Sync {
    /// Persist a new user. The store's unique index on
    /// (project_id, email) is the authoritative duplicate guard.
    fn create(&self, input: CreateUser) -> impl Future<Output = CoreResult<User>> + Send;
    fn get_by_id(
        &self,
        project_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = CoreResult<User>> + Send;
    /// Lookup by already-lower-cased email within a project.
    fn get_by_email(
        &self,
        project_id: Uuid,
        email: &str,
    ) -> impl Future<Output = CoreResult<User>> + Send;
    fn set_last_login(
        &self,
        project_id: Uuid,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> impl Future<Output = CoreResult<()>> + Send;
    /// Deletes the user and cascades to their sessions.
    fn delete(&self, project_id: Uuid, id: Uuid) -> impl Future<Output = CoreResult<()>> + Send;
}

pub trait SessionRepository: Send + Sync {
    /// Persist a new session. The store's unique index on `token` is
    /// the authoritative collision guard.
    fn create(&self, input: CreateSession) -> impl Future<Output = CoreResult<Session>> + Send;
    /// Lookup by raw token, returning only sessions with
    /// `expires_at > now`. Expired and unknown tokens are both
    /// `NotFound`, so callers cannot tell them apart.
    fn get_valid_by_token(
        &self,
        token: &str,
    ) -> impl Future<Output = CoreResult<Session>> + Send;
    /// Remove all expired sessions, returning how many were deleted.
    fn cleanup_expired(&self, project_id: Uuid) -> impl Future<Output = CoreResult<u64>> + Send;
}
