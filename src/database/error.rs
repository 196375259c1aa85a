//! Database Error Types

use thiserror::Error;

/// Errors raised by schema introspection and query execution
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DatabaseError {
    /// The database could not be reached
    #[error("Database connection failed: {0}")]
    Connection(String),

    /// Statement rejected by the read-only check, never sent to the database
    #[error("Query not supported.")]
    UnsupportedQuery,

    /// Error reported by the database while running a statement
    #[error("{0}")]
    Query(String),

    /// Catalog query returned something that could not be decoded
    #[error("Schema introspection failed: {0}")]
    Introspection(String),
}

impl From<tokio_postgres::Error> for DatabaseError {
    fn from(err: tokio_postgres::Error) -> Self {
        match err.as_db_error() {
            Some(db) => DatabaseError::Query(db.message().to_string()),
            None if err.is_closed() => DatabaseError::Connection(err.to_string()),
            None => DatabaseError::Query(err.to_string()),
        }
    }
}

/// Result type for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;
