//! Error types for the registry crate.

use miette::Diagnostic;
use pkgdex_dl::error::DownloadError;
use pkgdex_events::FailureKind;
use thiserror::Error;

/// Errors raised while resolving manifests or fetching package metadata.
///
/// None of these abort a sync on their own: the resolver degrades the
/// failing branch and the metadata fetcher skips the failing package.
#[derive(Error, Diagnostic, Debug)]
pub enum RegistryError {
    #[error(transparent)]
    #[diagnostic(
        code(pkgdex_registry::download),
        help("Check your network connection and the repository location")
    )]
    Download(#[from] DownloadError),

    #[error("Invalid JSON manifest: {0}")]
    #[diagnostic(
        code(pkgdex_registry::json),
        help("The manifest may be corrupted or in an invalid format")
    )]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML manifest: {0}")]
    #[diagnostic(
        code(pkgdex_registry::yaml),
        help("The manifest may be corrupted or in an invalid format")
    )]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid location '{location}': {source}")]
    #[diagnostic(
        code(pkgdex_registry::invalid_url),
        help("Relative includes need an absolute http(s) base location")
    )]
    InvalidUrl {
        location: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Manifest '{location}' includes itself through {}", .chain.join(" -> "))]
    #[diagnostic(
        code(pkgdex_registry::cyclic_include),
        help("Remove the include that points back to an ancestor manifest")
    )]
    CyclicInclude {
        location: String,
        chain: Vec<String>,
    },

    #[error("Source location '{0}' is not of the form github:<owner>/<repo>")]
    #[diagnostic(
        code(pkgdex_registry::malformed_source),
        help("Only github-hosted packages can be indexed")
    )]
    MalformedSourceLocation(String),
}

impl RegistryError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Download(_) | Self::InvalidUrl { .. } => FailureKind::Network,
            Self::Json(_) | Self::Yaml(_) => FailureKind::Parse,
            Self::CyclicInclude { .. } => FailureKind::CyclicInclude,
            Self::MalformedSourceLocation(_) => FailureKind::MalformedSourceLocation,
        }
    }
}

/// A specialized Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_and_kind() {
        let err = RegistryError::MalformedSourceLocation("npm:left-pad".to_string());
        assert_eq!(
            err.to_string(),
            "Source location 'npm:left-pad' is not of the form github:<owner>/<repo>"
        );
        assert_eq!(err.kind(), FailureKind::MalformedSourceLocation);

        let err = RegistryError::CyclicInclude {
            location: "https://a/m.json".to_string(),
            chain: vec!["https://a/m.json".to_string(), "https://b/m.json".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Manifest 'https://a/m.json' includes itself through https://a/m.json -> https://b/m.json"
        );
        assert_eq!(err.kind(), FailureKind::CyclicInclude);

        let err = RegistryError::Download(DownloadError::HttpError {
            status: 404,
            url: "https://a/m.json".to_string(),
        });
        assert_eq!(err.kind(), FailureKind::Network);
    }
}
