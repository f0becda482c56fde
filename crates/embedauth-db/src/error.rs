//! Database-specific error types and conversions.

use embedauth_core::error::CoreError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Record already exists: {entity}")]
    AlreadyExists { entity: String },
}

impl From<DbError> for CoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => CoreError::NotFound { entity, id },
            DbError::AlreadyExists { entity } => CoreError::AlreadyExists { entity },
            other => CoreError::Database(other.to_string()),
        }
    }
}

/// Map a write error to `AlreadyExists` when it was caused by a
/// UNIQUE index violation, so racing duplicate inserts surface as a
/// conflict rather than an opaque database failure.
pub(crate) fn map_write_err(err: surrealdb::Error, entity: &str) -> DbError {
    let text = err.to_string();
    if text.contains("already contains") {
        DbError::AlreadyExists {
            entity: entity.to_string(),
        }
    } else {
        DbError::Surreal(err)
    }
}
