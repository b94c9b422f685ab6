//! Repository Module
//!
//! CRUD operations over the SQLite pool. Repositories are plain async
//! functions taking `&SqlitePool`; date→millis conversion happens in the
//! API layer, repositories only see `i64` Unix millis and `YYYY-MM-DD`
//! business-date strings.

pub mod cashbook;
pub mod client;
pub mod day_status;
pub mod delivery;
pub mod driver;
pub mod driver_expense;
pub mod ledger;
pub mod product;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Business rule violation: {0}")]
    BusinessRule(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound(err.to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepoError::Duplicate(err.to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(err: serde_json::Error) -> Self {
        RepoError::Database(format!("JSON encode error: {err}"))
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
