use miette::Diagnostic;
use pkgdex_config::error::ConfigError;
use pkgdex_dl::error::DownloadError;
use pkgdex_operations::OperationError;
use pkgdex_utils::error::PathError;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Path(#[from] PathError),

    #[error("Invalid proxy '{proxy}'")]
    #[diagnostic(
        code(pkgdex::invalid_proxy),
        help("Use a proxy URL such as http://host:port or socks5://host:port")
    )]
    InvalidProxy {
        proxy: String,
        #[source]
        source: ureq::Error,
    },

    #[error("Failed to serialize output: {0}")]
    #[diagnostic(code(pkgdex::json))]
    Json(#[from] serde_json::Error),

    #[error("Package '{0}' not found")]
    #[diagnostic(
        code(pkgdex::package_not_found),
        help("Run `pkgdex sync` to refresh the index, or `pkgdex search` to find the exact name")
    )]
    PackageNotFound(String),
}

pub type CliResult<T> = std::result::Result<T, CliError>;
