use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

pub const DEFAULT_REPOSITORY_NAME: &str = "rewpkgs";
pub const DEFAULT_REPOSITORY_LOCATION: &str =
    "//raw.githubusercontent.com/kevinJ045/rewpkgs/main/main.yaml";

/// A remote repository manifest the index is built from.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Repository {
    /// Unique name of the repository.
    pub name: String,

    /// Location of the repository manifest.
    /// Accepts absolute URLs, `//host/path` (https) and `//.host/path` (http).
    #[serde(alias = "url")]
    pub location: String,
}

impl Repository {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
        }
    }

    pub fn default_repository() -> Self {
        Self::new(DEFAULT_REPOSITORY_NAME, DEFAULT_REPOSITORY_LOCATION)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() || self.name.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidRepository(self.name.clone()));
        }
        if self.location.trim().is_empty() {
            return Err(ConfigError::InvalidRepositoryLocation(self.name.clone()));
        }
        Ok(())
    }
}
