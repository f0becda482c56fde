//! Project (tenant) domain model.
//!
//! A project is an isolated namespace of users and sessions, selected
//! by a secret API key presented on every widget call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An isolated tenant namespace.
///
/// `allowed_origins` restricts which browser origins may register or
/// log in through this project's widget; an empty list means
/// unrestricted. `theme` and `redirect_url` are display hints the core
/// treats as opaque.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    /// Globally unique tenant secret (`ea_<48 hex>`).
    pub api_key: String,
    pub allowed_origins: Vec<String>,
    pub theme: String,
    pub redirect_url: String,
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Whether the project restricts browser origins at all.
    pub fn restricts_origins(&self) -> bool {
        !self.allowed_origins.is_empty()
    }
}

/// Fields required to create a new project. The API key is generated
/// server-side, never supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub api_key: String,
    pub allowed_origins: Vec<String>,
    pub theme: String,
    pub redirect_url: String,
}

/// Fields that can be updated on an existing project.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub allowed_origins: Option<Vec<String>>,
    pub theme: Option<String>,
    pub redirect_url: Option<String>,
}

/// Project plus the aggregate counts shown by the admin listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSummary {
    #[serde(flatten)]
    pub project: Project,
    pub user_count: u64,
    pub active_session_count: u64,
}
