//! SurrealDB implementation of [`SessionRepository`].
//!
//! Validity is enforced in the query itself: `get_valid_by_token`
//! only ever returns sessions with `expires_at > time::now()`, so an
//! expired token and an unknown one are indistinguishable to callers.

use embedauth_core::error::CoreResult;
use embedauth_core::models::session::{CreateSession, Session};
use embedauth_core::repository::SessionRepository;
use serde::Deserialize;
use surrealdb::sql::Datetime;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;

use crate::error::{DbError, map_write_err};

#[derive(Debug, Deserialize)]
struct SessionRow {
    user_id: String,
    project_id: String,
    token: String,
    expires_at: Datetime,
    created_at: Datetime,
}

#[derive(Debug, Deserialize)]
struct SessionRowWithId {
    record_id: String,
    user_id: String,
    project_id: String,
    token: String,
    expires_at: Datetime,
    created_at: Datetime,
}

fn row_to_session(row: SessionRow, id: Uuid) -> Result<Session, DbError> {
    let user_id = Uuid::parse_str(&row.user_id)
        .map_err(|e| DbError::Migration(format!("invalid user UUID: {e}")))?;
    let project_id = Uuid::parse_str(&row.project_id)
        .map_err(|e| DbError::Migration(format!("invalid project UUID: {e}")))?;
    Ok(Session {
        id,
        user_id,
        project_id,
        token: row.token,
        expires_at: row.expires_at.into(),
        created_at: row.created_at.into(),
    })
}

impl SessionRowWithId {
    fn try_into_session(self) -> Result<Session, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Migration(format!("invalid user UUID: {e}")))?;
        let project_id = Uuid::parse_str(&self.project_id)
            .map_err(|e| DbError::Migration(format!("invalid project UUID: {e}")))?;
        Ok(Session {
            id,
            user_id,
            project_id,
            token: self.token,
            expires_at: self.expires_at.into(),
            created_at: self.created_at.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Session repository.
#[derive(Clone)]
pub struct SurrealSessionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSessionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> SessionRepository for SurrealSessionRepository<C> {
    async fn create(&self, input: CreateSession) -> CoreResult<Session> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::thing('session', $id) SET \
                 user_id = $user_id, \
                 project_id = $project_id, \
                 token = $token_value, \
                 expires_at = $expires_at, \
                 created_at = $created_at",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("project_id", input.project_id.to_string()))
            .bind(("token_value", input.token))
            .bind(("expires_at", Datetime::from(input.expires_at)))
            .bind(("created_at", Datetime::from(input.created_at)))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| map_write_err(e, "session"))?;

        let rows: Vec<SessionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "session".into(),
            id: id_str,
        })?;

        row_to_session(row, id).map_err(Into::into)
    }

    async fn get_valid_by_token(&self, token: &str) -> CoreResult<Session> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM session \
                 WHERE token = $token_value AND expires_at > time::now()",
            )
            .bind(("token_value", token.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SessionRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "session".into(),
            id: "token=<redacted>".into(),
        })?;

        row.try_into_session().map_err(Into::into)
    }

    async fn cleanup_expired(&self, project_id: Uuid) -> CoreResult<u64> {
        // Count expired sessions first, then delete.
        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM session \
                 WHERE project_id = $project_id AND expires_at < time::now() \
                 GROUP ALL",
            )
            .bind(("project_id", project_id.to_string()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        self.db
            .query("DELETE session WHERE project_id = $project_id AND expires_at < time::now()")
            .bind(("project_id", project_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(total)
    }
}
