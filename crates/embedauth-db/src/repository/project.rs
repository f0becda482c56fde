//! SurrealDB implementation of [`ProjectRepository`].

use embedauth_core::error::CoreResult;
use embedauth_core::models::project::{CreateProject, Project, ProjectSummary, UpdateProject};
use embedauth_core::repository::ProjectRepository;
use serde::Deserialize;
use surrealdb::sql::Datetime;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;

use crate::error::{DbError, map_write_err};

#[derive(Debug, Deserialize)]
struct ProjectRow {
    name: String,
    api_key: String,
    allowed_origins: Vec<String>,
    theme: String,
    redirect_url: String,
    created_at: Datetime,
}

#[derive(Debug, Deserialize)]
struct ProjectRowWithId {
    record_id: String,
    name: String,
    api_key: String,
    allowed_origins: Vec<String>,
    theme: String,
    redirect_url: String,
    created_at: Datetime,
}

impl ProjectRow {
    fn into_project(self, id: Uuid) -> Project {
        Project {
            id,
            name: self.name,
            api_key: self.api_key,
            allowed_origins: self.allowed_origins,
            theme: self.theme,
            redirect_url: self.redirect_url,
            created_at: self.created_at.into(),
        }
    }
}

impl ProjectRowWithId {
    fn try_into_project(self) -> Result<Project, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid project UUID: {e}")))?;
        Ok(Project {
            id,
            name: self.name,
            api_key: self.api_key,
            allowed_origins: self.allowed_origins,
            theme: self.theme,
            redirect_url: self.redirect_url,
            created_at: self.created_at.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Project repository.
#[derive(Clone)]
pub struct SurrealProjectRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealProjectRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn count(&self, query: &str, project_id: &Uuid) -> Result<u64, DbError> {
        let mut result = self
            .db
            .query(query)
            .bind(("project_id", project_id.to_string()))
            .await?;
        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}

impl<C: Connection> ProjectRepository for SurrealProjectRepository<C> {
    async fn create(&self, input: CreateProject) -> CoreResult<Project> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::thing('project', $id) SET \
                 name = $name, \
                 api_key = $api_key, \
                 allowed_origins = $allowed_origins, \
                 theme = $theme, \
                 redirect_url = $redirect_url",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("api_key", input.api_key))
            .bind(("allowed_origins", input.allowed_origins))
            .bind(("theme", input.theme))
            .bind(("redirect_url", input.redirect_url))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| map_write_err(e, "project"))?;

        let rows: Vec<ProjectRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "project".into(),
            id: id_str,
        })?;

        Ok(row.into_project(id))
    }

    async fn get_by_id(&self, id: Uuid) -> CoreResult<Project> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::thing('project', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProjectRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "project".into(),
            id: id_str,
        })?;

        Ok(row.into_project(id))
    }

    async fn get_by_api_key(&self, api_key: &str) -> CoreResult<Project> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM project \
                 WHERE api_key = $api_key",
            )
            .bind(("api_key", api_key.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProjectRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "project".into(),
            // Never echo the secret back into logs or errors.
            id: "api_key=<redacted>".into(),
        })?;

        Ok(row.try_into_project()?)
    }

    async fn update(&self, id: Uuid, input: UpdateProject) -> CoreResult<Project> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.allowed_origins.is_some() {
            sets.push("allowed_origins = $allowed_origins");
        }
        if input.theme.is_some() {
            sets.push("theme = $theme");
        }
        if input.redirect_url.is_some() {
            sets.push("redirect_url = $redirect_url");
        }

        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query = format!(
            "UPDATE type::thing('project', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(allowed_origins) = input.allowed_origins {
            builder = builder.bind(("allowed_origins", allowed_origins));
        }
        if let Some(theme) = input.theme {
            builder = builder.bind(("theme", theme));
        }
        if let Some(redirect_url) = input.redirect_url {
            builder = builder.bind(("redirect_url", redirect_url));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| map_write_err(e, "project"))?;

        let rows: Vec<ProjectRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "project".into(),
            id: id_str,
        })?;

        Ok(row.into_project(id))
    }

    async fn delete(&self, id: Uuid) -> CoreResult<()> {
        // Cascade: sessions and users first, then the project itself.
        self.db
            .query("DELETE session WHERE project_id = $id")
            .query("DELETE user WHERE project_id = $id")
            .query("DELETE type::thing('project', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self) -> CoreResult<Vec<ProjectSummary>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM project \
                 ORDER BY created_at DESC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProjectRowWithId> = result.take(0).map_err(DbError::from)?;

        let mut summaries = Vec::with_capacity(rows.len());
        for row in rows {
            let project = row.try_into_project()?;
            let user_count = self
                .count(
                    "SELECT count() AS total FROM user \
                     WHERE project_id = $project_id GROUP ALL",
                    &project.id,
                )
                .await?;
            let active_session_count = self
                .count(
                    "SELECT count() AS total FROM session \
                     WHERE project_id = $project_id \
                     AND expires_at > time::now() GROUP ALL",
                    &project.id,
                )
                .await?;
            summaries.push(ProjectSummary {
                project,
                user_count,
                active_session_count,
            });
        }

        Ok(summaries)
    }
}
