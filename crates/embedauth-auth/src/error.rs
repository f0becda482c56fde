//! Authentication error taxonomy.
//!
//! Each variant maps to exactly one HTTP status and one short
//! message at the server boundary. `InvalidCredentials` deliberately
//! covers both "no such user" and "wrong password";
//! `InvalidOrExpiredSession` covers unknown, expired, and
//! wrong-tenant tokens alike.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("API key required")]
    MissingApiKey,

    #[error("Invalid API key")]
    UnknownTenant,

    #[error("Origin not allowed")]
    OriginNotAllowed,

    #[error("Email and password required")]
    MissingFields,

    #[error("Password must be at least 8 characters")]
    PasswordTooShort,

    #[error("User already exists")]
    UserExists,

    /// Admin-surface lookup miss; never produced by the widget
    /// endpoints, which report [`AuthError::UnknownTenant`] instead.
    #[error("Project not found")]
    ProjectNotFound,

    #[error("Project name required")]
    ProjectNameRequired,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired session")]
    InvalidOrExpiredSession,

    #[error("cryptography error: {0}")]
    Crypto(String),

    #[error("storage error: {0}")]
    Store(String),
}
