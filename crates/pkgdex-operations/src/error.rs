use miette::Diagnostic;
use pkgdex_config::error::ConfigError;
use pkgdex_db::DbError;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum OperationError {
    #[error("Package store unavailable at {path}: {reason}")]
    #[diagnostic(
        code(pkgdex_operations::store_unavailable),
        help("Check `db_path` in your config or the PKGDEX_DB environment variable")
    )]
    StoreUnavailable { path: String, reason: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] DbError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

pub type OperationResult<T> = std::result::Result<T, OperationError>;
