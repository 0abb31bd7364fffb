use miette::Diagnostic;
use pkgdex_utils::error::PathError;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(pkgdex_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(pkgdex_config::toml_deserialize),
        help("Check your config.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Configuration file already exists at {0}")]
    #[diagnostic(
        code(pkgdex_config::already_exists),
        help("Remove the existing config file or use a different location")
    )]
    ConfigAlreadyExists(String),

    #[error("Invalid repository name: {0:?}")]
    #[diagnostic(
        code(pkgdex_config::invalid_repository),
        help("Repository names must be non-empty and contain no whitespace")
    )]
    InvalidRepository(String),

    #[error("Repository '{0}' has no manifest location")]
    #[diagnostic(
        code(pkgdex_config::invalid_repository_location),
        help("Set `location` to a URL or a `//host/path` shorthand")
    )]
    InvalidRepositoryLocation(String),

    #[error("Duplicate repository name: {0}")]
    #[diagnostic(
        code(pkgdex_config::duplicate_repo),
        help("Each repository must have a unique name")
    )]
    DuplicateRepositoryName(String),

    #[error("Repository '{0}' not found")]
    #[diagnostic(
        code(pkgdex_config::repo_not_found),
        help("Run `pkgdex repo list` to see configured repositories")
    )]
    RepositoryNotFound(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(pkgdex_config::io))]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Path(#[from] PathError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
