//! Session domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A live login.
///
/// `project_id` is denormalised so validation is a single lookup plus
/// a tenant comparison. The raw bearer token is stored; it is already
/// an unguessable 256-bit secret. A session ends only by reaching
/// `expires_at`; there is no revocation flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Expiry is inclusive: a session is invalid at exactly
    /// `expires_at`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}


/// Fields required to persist a new session.
///
/// `created_at` is supplied by the issuer rather than defaulted by
/// the store, so `expires_at = created_at + lifetime` holds exactly.
#[derive(Debug, Clone)]
pub struct CreateSession {
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
