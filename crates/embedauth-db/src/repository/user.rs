//! SurrealDB implementation of [`UserRepository`].
//!
//! Emails arrive already lower-cased from the auth layer; the
//! (project_id, email) UNIQUE index makes the store the authoritative
//! guard against duplicate registration races.

use chrono::{DateTime, Utc};
use embedauth_core::error::CoreResult;
use embedauth_core::models::user::{CreateUser, User};
use embedauth_core::repository::UserRepository;
use serde::Deserialize;
use surrealdb::sql::Datetime;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;

use crate::error::{DbError, map_write_err};

#[derive(Debug, Deserialize)]
struct UserRow {
    project_id: String,
    email: String,
    password_hash: String,
    display_name: Option<String>,
    verified: bool,
    created_at: Datetime,
    last_login: Option<Datetime>,
}

#[derive(Debug, Deserialize)]
struct UserRowWithId {
    record_id: String,
    project_id: String,
    email: String,
    password_hash: String,
    display_name: Option<String>,
    verified: bool,
    created_at: Datetime,
    last_login: Option<Datetime>,
}

impl UserRow {
    fn into_user(self, id: Uuid) -> Result<User, DbError> {
        let project_id = Uuid::parse_str(&self.project_id)
            .map_err(|e| DbError::Migration(format!("invalid project UUID: {e}")))?;
        Ok(User {
            id,
            project_id,
            email: self.email,
            password_hash: self.password_hash,
            display_name: self.display_name,
            verified: self.verified,
            created_at: self.created_at.into(),
            last_login: self.last_login.map(Into::into),
        })
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        let project_id = Uuid::parse_str(&self.project_id)
            .map_err(|e| DbError::Migration(format!("invalid project UUID: {e}")))?;
        Ok(User {
            id,
            project_id,
            email: self.email,
            password_hash: self.password_hash,
            display_name: self.display_name,
            verified: self.verified,
            created_at: self.created_at.into(),
            last_login: self.last_login.map(Into::into),
        })
    }
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> CoreResult<User> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::thing('user', $id) SET \
                 project_id = $project_id, \
                 email = $email, \
                 password_hash = $password_hash, \
                 display_name = $display_name, \
                 verified = false, \
                 last_login = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("project_id", input.project_id.to_string()))
            .bind(("email", input.email))
            .bind(("password_hash", input.password_hash))
            .bind(("display_name", input.display_name))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| map_write_err(e, "user"))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_id(&self, project_id: Uuid, id: Uuid) -> CoreResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::thing('user', $id) \
                 WHERE project_id = $project_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("project_id", project_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_email(&self, project_id: Uuid, email: &str) -> CoreResult<User> {
        let email_owned = email.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE project_id = $project_id AND email = $email",
            )
            .bind(("project_id", project_id.to_string()))
            .bind(("email", email_owned.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: format!("email={email_owned}"),
        })?;

        Ok(row.try_into_user()?)
    }

    async fn set_last_login(&self, project_id: Uuid, id: Uuid, at: DateTime<Utc>) -> CoreResult<()> {
        self.db
            .query(
                "UPDATE type::thing('user', $id) SET \
                 last_login = $at \
                 WHERE project_id = $project_id",
            )
            .bind(("id", id.to_string()))
            .bind(("project_id", project_id.to_string()))
            .bind(("at", Datetime::from(at)))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn delete(&self, project_id: Uuid, id: Uuid) -> CoreResult<()> {
        // Cascade: sessions first, then the user row.
        self.db
            .query("DELETE session WHERE project_id = $project_id AND user_id = $id")
            .query(
                "DELETE type::thing('user', $id) \
                 WHERE project_id = $project_id",
            )
            .bind(("id", id.to_string()))
            .bind(("project_id", project_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }
}
