//! Metadata store error types.

use sqlx::error::DatabaseError;
use thiserror::Error;

/// Metadata store operation errors.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// A unique column collided on insert. Carries the column name.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for metadata operations.
pub type MetadataResult<T> = std::result::Result<T, MetadataError>;

/// Map an insert failure onto `AlreadyExists` when it is a unique violation
/// on one of `columns`.
///
/// SQLite names the column in the message ("UNIQUE constraint failed:
/// admins.username"); PostgreSQL reports the constraint name
/// ("admins_username_key").
pub(crate) fn map_unique_violation(err: sqlx::Error, columns: &[&str]) -> MetadataError {
    if let sqlx::Error::Database(db_err) = &err
        && let Some(column) = unique_violation_column(db_err.as_ref(), columns)
    {
        return MetadataError::AlreadyExists(column.to_string());
    }
    MetadataError::Database(err)
}

fn unique_violation_column<'a>(db_err: &dyn DatabaseError, columns: &[&'a str]) -> Option<&'a str> {
    if !db_err.is_unique_violation() {
        return None;
    }
    let haystack = db_err
        .constraint()
        .map(str::to_string)
        .unwrap_or_else(|| db_err.message().to_string());
    columns
        .iter()
        .copied()
        .find(|column| haystack.contains(column))
}
