//! Repository Module
//!
//! Free functions over `&mut SqliteConnection`, so the same call works on a
//! pooled connection or inside a transaction (`&mut *tx`).

pub mod department;
pub mod employee;

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique index violation, carrying the violated column
    #[error("Duplicate value for {0}")]
    Duplicate(String),

    #[error("Foreign key violation: {0}")]
    ForeignKey(String),

    /// Department would become its own ancestor
    #[error("Department hierarchy cycle (department {0:?})")]
    Cycle(Option<i64>),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            let message = db.message();
            if db.is_unique_violation() {
                // "UNIQUE constraint failed: employee.national_id"
                let column = message.rsplit('.').next().unwrap_or(message).trim();
                return RepoError::Duplicate(column.to_string());
            }
            if db.is_foreign_key_violation() {
                return RepoError::ForeignKey(message.to_string());
            }
            if db.is_check_violation() && message.contains("department_no_self_parent") {
                return RepoError::Cycle(None);
            }
        }
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(column) => match column.as_str() {
                "national_id" => AppError::new(ErrorCode::NationalIdExists)
                    .with_detail("field", "national_id"),
                "secondary_id" => AppError::new(ErrorCode::SecondaryIdExists)
                    .with_detail("field", "secondary_id"),
                "manager_id" => AppError::new(ErrorCode::EmployeeIsManager)
                    .with_detail("field", "manager_id"),
                _ => AppError::already_exists(column),
            },
            RepoError::ForeignKey(msg) => {
                tracing::warn!(error = %msg, "Foreign key violation at commit");
                AppError::new(ErrorCode::ReferenceConflict)
            }
            RepoError::Cycle(Some(id)) => {
                AppError::new(ErrorCode::HierarchyCycle).with_detail("department_id", id)
            }
            RepoError::Cycle(None) => AppError::new(ErrorCode::HierarchyCycle),
            RepoError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Encode ids as a JSON array for `IN (SELECT value FROM json_each(?))`.
///
/// One bind regardless of list length, so large id sets never hit
/// SQLite's bound-parameter limit.
pub(crate) fn json_id_array(ids: &[i64]) -> String {
    serde_json::Value::from(ids.to_vec()).to_string()
}
