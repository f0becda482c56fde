//! Origin allow-list enforcement.
//!
//! Applied uniformly to both mutating entry points (register and
//! login); the current-user lookup is read-only and already gated by
//! the bearer token.

use embedauth_core::models::project::Project;

use crate::error::AuthError;

/// Marker origin used by non-browser callers (server-to-server,
/// curl). Deliberately exempt from the allow-list check.
pub const WILDCARD_ORIGIN: &str = "*";

/// Check a request's declared origin against the project allow-list.
///
/// An empty allow-list means the project is unrestricted.
pub fn check(project: &Project, origin: &str) -> Result<(), AuthError> {
    if !project.restricts_origins() || origin == WILDCARD_ORIGIN {
        return Ok(());
    }
    if project.allowed_origins.iter().any(|allowed| allowed == origin) {
        Ok(())
    } else {
        Err(AuthError::OriginNotAllowed)
    }
}
