//! Database-specific error types and conversions.

use sqlx::error::ErrorKind;
use tenancy_core::error::TenancyError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("PostgreSQL error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Invalid value in column {column}: {value}")]
    InvalidColumn { column: String, value: String },

    #[error("Invalid timestamp {value:?}: {reason}")]
    Timestamp { value: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DbError {
    pub(crate) fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

impl From<DbError> for TenancyError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => TenancyError::NotFound { entity, id },
            DbError::Sqlx(sqlx::Error::Database(db_err)) => {
                let constraint = db_err.constraint().unwrap_or_default().to_string();
                match db_err.kind() {
                    ErrorKind::UniqueViolation => TenancyError::UniqueViolation { constraint },
                    ErrorKind::ForeignKeyViolation => {
                        TenancyError::ForeignKeyViolation { constraint }
                    }
                    _ => TenancyError::Database(db_err.to_string()),
                }
            }
            other => TenancyError::Database(other.to_string()),
        }
    }
}
