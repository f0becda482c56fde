//! Auth gateway: register, login, and current-user orchestration.
//!
//! Each operation is stateless per request: resolve the tenant by API
//! key first, then run the operation-specific logic. All failures are
//! terminal for the request; nothing is retried.

use chrono::{DateTime, Duration, Utc};
use embedauth_core::error::CoreError;
use embedauth_core::models::project::{CreateProject, Project, ProjectSummary, UpdateProject};
use embedauth_core::models::session::CreateSession;
use embedauth_core::models::user::{CreateUser, PublicUser, User};
use embedauth_core::repository::{ProjectRepository, SessionRepository, UserRepository};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::keys;
use crate::origin;
use crate::password;

/// Email and password as submitted by the widget, plus the optional
/// display name used on registration.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsInput {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Successful registration or login: the public user projection plus
/// the freshly issued bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSuccess {
    pub user: PublicUser,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Fields accepted when creating a project through the admin surface.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub redirect_url: Option<String>,
}

/// The request-handling core.
///
/// Generic over repository implementations so the auth layer has no
/// dependency on the database crate; no state is held across requests
/// beyond the repository handles themselves.
pub struct AuthGateway<P, U, S>
where
    P: ProjectRepository,
    U: UserRepository,
    S: SessionRepository,
{
    projects: P,
    users: U,
    sessions: S,
    config: AuthConfig,
}

impl<P, U, S> AuthGateway<P, U, S>
where
    P: ProjectRepository,
    U: UserRepository,
    S: SessionRepository,
{
    pub fn new(projects: P, users: U, sessions: S, config: AuthConfig) -> Self {
        Self {
            projects,
            users,
            sessions,
            config,
        }
    }

    /// Resolve the tenant for a request. Every operation calls this
    /// first and rejects before touching credentials.
    pub async fn resolve_tenant(&self, api_key: Option<&str>) -> Result<Project, AuthError> {
        let api_key = match api_key {
            Some(key) if !key.is_empty() => key,
            _ => return Err(AuthError::MissingApiKey),
        };
        match self.projects.get_by_api_key(api_key).await {
            Ok(project) => Ok(project),
            Err(CoreError::NotFound { .. }) => Err(AuthError::UnknownTenant),
            Err(e) => Err(AuthError::Store(e.to_string())),
        }
    }

    /// Register a new user and issue their first session.
    pub async fn register(
        &self,
        api_key: Option<&str>,
        request_origin: &str,
        input: CredentialsInput,
    ) -> Result<AuthSuccess, AuthError> {
        let project = self.resolve_tenant(api_key).await?;
        origin::check(&project, request_origin)?;

        let email = normalize_email(&input.email);
        if email.is_empty() || input.password.is_empty() {
            return Err(AuthError::MissingFields);
        }
        if input.password.chars().count() < self.config.min_password_length {
            return Err(AuthError::PasswordTooShort);
        }

        // Friendly pre-check; the (project_id, email) UNIQUE index is
        // what actually decides a concurrent race.
        match self.users.get_by_email(project.id, &email).await {
            Ok(_) => return Err(AuthError::UserExists),
            Err(CoreError::NotFound { .. }) => {}
            Err(e) => return Err(AuthError::Store(e.to_string())),
        }

        let password_hash = password::hash_password(&input.password)?;
        let display_name = input
            .display_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let user = match self
            .users
            .create(CreateUser {
                project_id: project.id,
                email,
                password_hash,
                display_name,
            })
            .await
        {
            Ok(user) => user,
            Err(CoreError::AlreadyExists { .. }) => return Err(AuthError::UserExists),
            Err(e) => return Err(AuthError::Store(e.to_string())),
        };

        debug!(project_id = %project.id, user_id = %user.id, "user registered");
        self.issue_session(&user, &project).await
    }

    /// Verify credentials and issue a fresh session.
    pub async fn login(
        &self,
        api_key: Option<&str>,
        request_origin: &str,
        input: CredentialsInput,
    ) -> Result<AuthSuccess, AuthError> {
        let project = self.resolve_tenant(api_key).await?;
        origin::check(&project, request_origin)?;

        let email = normalize_email(&input.email);
        if email.is_empty() || input.password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        // An unknown email and a wrong password produce the identical
        // failure; callers cannot enumerate users through errors.
        let user = match self.users.get_by_email(project.id, &email).await {
            Ok(user) => user,
            Err(CoreError::NotFound { .. }) => return Err(AuthError::InvalidCredentials),
            Err(e) => return Err(AuthError::Store(e.to_string())),
        };

        if !password::verify_password(&input.password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now();
        self.users
            .set_last_login(project.id, user.id, now)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;

        debug!(project_id = %project.id, user_id = %user.id, "user logged in");
        self.issue_session(&user, &project).await
    }

    /// Resolve the user behind a bearer token.
    ///
    /// Wrong tenant, unknown token, and expired session all collapse
    /// into the same failure.
    pub async fn current_user(
        &self,
        api_key: Option<&str>,
        token: Option<&str>,
    ) -> Result<PublicUser, AuthError> {
        let project = self.resolve_tenant(api_key).await?;

        let token = match token {
            Some(t) if !t.is_empty() => t,
            _ => return Err(AuthError::InvalidOrExpiredSession),
        };

        let session = match self.sessions.get_valid_by_token(token).await {
            Ok(session) => session,
            Err(CoreError::NotFound { .. }) => return Err(AuthError::InvalidOrExpiredSession),
            Err(e) => return Err(AuthError::Store(e.to_string())),
        };

        if session.project_id != project.id {
            return Err(AuthError::InvalidOrExpiredSession);
        }

        match self.users.get_by_id(project.id, session.user_id).await {
            Ok(user) => Ok(user.to_public()),
            Err(CoreError::NotFound { .. }) => Err(AuthError::InvalidOrExpiredSession),
            Err(e) => Err(AuthError::Store(e.to_string())),
        }
    }

    async fn issue_session(
        &self,
        user: &User,
        project: &Project,
    ) -> Result<AuthSuccess, AuthError> {
        let token = keys::generate_session_token();
        let created_at = Utc::now();
        let expires_at = created_at + Duration::days(self.config.session_lifetime_days);

        self.sessions
            .create(CreateSession {
                user_id: user.id,
                project_id: project.id,
                token: token.clone(),
                expires_at,
                created_at,
            })
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;

        Ok(AuthSuccess {
            user: user.to_public(),
            token,
            expires_at,
        })
    }

    // -------------------------------------------------------------------
    // Admin surface (dashboard glue over the project store)
    // -------------------------------------------------------------------

    /// Create a project, generating its API key server-side.
    pub async fn create_project(&self, input: NewProject) -> Result<Project, AuthError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(AuthError::ProjectNameRequired);
        }

        self.projects
            .create(CreateProject {
                name,
                api_key: keys::generate_api_key(),
                allowed_origins: input.allowed_origins,
                theme: input.theme.unwrap_or_else(|| "dark".to_string()),
                redirect_url: input.redirect_url.unwrap_or_default(),
            })
            .await
            .map_err(|e| AuthError::Store(e.to_string()))
    }

    /// List projects with user and live-session counts.
    pub async fn list_projects(&self) -> Result<Vec<ProjectSummary>, AuthError> {
        self.projects
            .list()
            .await
            .map_err(|e| AuthError::Store(e.to_string()))
    }

    /// Update a project's mutable fields.
    pub async fn update_project(
        &self,
        id: Uuid,
        input: UpdateProject,
    ) -> Result<Project, AuthError> {
        match self.projects.update(id, input).await {
            Ok(project) => Ok(project),
            Err(CoreError::NotFound { .. }) => Err(AuthError::ProjectNotFound),
            Err(e) => Err(AuthError::Store(e.to_string())),
        }
    }

    /// Purge a project's expired sessions, returning how many were
    /// removed. Live sessions are untouched; this is housekeeping,
    /// not revocation.
    pub async fn cleanup_expired_sessions(&self, id: Uuid) -> Result<u64, AuthError> {
        match self.projects.get_by_id(id).await {
            Ok(_) => {}
            Err(CoreError::NotFound { .. }) => return Err(AuthError::ProjectNotFound),
            Err(e) => return Err(AuthError::Store(e.to_string())),
        }
        let removed = self
            .sessions
            .cleanup_expired(id)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        if removed > 0 {
            debug!(project_id = %id, removed, "expired sessions purged");
        }
        Ok(removed)
    }

    /// Delete a project, cascading to its users and sessions.
    pub async fn delete_project(&self, id: Uuid) -> Result<(), AuthError> {
        // Existence check first; the cascade itself is unconditional.
        match self.projects.get_by_id(id).await {
            Ok(_) => {}
            Err(CoreError::NotFound { .. }) => return Err(AuthError::ProjectNotFound),
            Err(e) => return Err(AuthError::Store(e.to_string())),
        }
        self.projects
            .delete(id)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_lower_cased_and_trimmed() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }
}
