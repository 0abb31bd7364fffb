//! Error types for pkgdex-db.

use miette::Diagnostic;
use thiserror::Error;

/// Database error type for pkgdex-db operations.
#[derive(Error, Diagnostic, Debug)]
pub enum DbError {
    #[error("Database connection failed: {0}")]
    #[diagnostic(
        code(pkgdex_db::connection),
        help("Check if the database path is writable")
    )]
    ConnectionError(String),

    #[error("Database query failed: {0}")]
    #[diagnostic(
        code(pkgdex_db::query),
        help("Try running 'pkgdex sync' to rebuild the index")
    )]
    QueryError(String),

    #[error("Database migration failed: {0}")]
    #[diagnostic(
        code(pkgdex_db::migration),
        help("The database schema may be corrupted. Try removing the database and re-syncing.")
    )]
    MigrationError(String),

    #[error("Error while {action}: {source}")]
    #[diagnostic(
        code(pkgdex_db::io),
        help("Check file permissions and disk space")
    )]
    IoError {
        action: String,
        source: std::io::Error,
    },

    #[error("Database lock poisoned")]
    #[diagnostic(code(pkgdex_db::poison))]
    PoisonError,
}

impl From<diesel::result::Error> for DbError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::DatabaseError(_, info) => {
                DbError::QueryError(info.message().to_string())
            }
            other => DbError::QueryError(other.to_string()),
        }
    }
}

impl From<diesel::result::ConnectionError> for DbError {
    fn from(err: diesel::result::ConnectionError) -> Self {
        DbError::ConnectionError(err.to_string())
    }
}

/// Result type alias for pkgdex-db operations.
pub type Result<T> = std::result::Result<T, DbError>;

/// Extension trait for adding context to I/O errors.
pub trait ErrorContext<T> {
    /// Adds context to an error, describing what action was being performed.
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            DbError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}
