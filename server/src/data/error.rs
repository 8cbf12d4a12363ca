//! Unified error type for data layer operations

use thiserror::Error;

use super::query::PredicateError;

#[derive(Error, Debug)]
pub enum DataError {
    /// SQLite database error
    #[error("SQLite error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Predicate construction failed (programming error, not user input)
    #[error(transparent)]
    Predicate(#[from] PredicateError),

    /// Migration failed
    #[error("Migration to version {version} failed: {error}")]
    MigrationFailed { version: i32, error: String },

    /// A bulk mutation was attempted with no predicates
    #[error("Where clause cannot be empty")]
    EmptyWhere,
}
