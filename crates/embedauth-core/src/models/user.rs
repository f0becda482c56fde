//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered end user of a project.
///
/// Email is unique within a project only; two projects may register
/// the same address independently. The stored email is always
/// lower-cased.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub project_id: Uuid,
    pub email: String,
    /// Argon2id PHC-format hash. Never serialised into responses.
    pub password_hash: String,
    pub display_name: Option<String>,
    /// Recorded but unused by the current flows.
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// The projection safe to return to callers. The hash and tenant
    /// internals never leave the server.
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            created_at: self.created_at,
        }
    }
}

/// Public-safe projection of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a new user. `password_hash` is computed
/// by the auth layer before this reaches a repository.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub project_id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub display_name: Option<String>,
}
