use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use pkgdex_utils::path::{resolve_path, xdg_config_home, xdg_data_home};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    error::{ConfigError, Result},
    repository::Repository,
};

pub const DEFAULT_RAW_CONTENT_BASE: &str = "https://raw.githubusercontent.com";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_SEARCH_LIMIT: usize = 20;
pub const DEFAULT_HTTP_TIMEOUT: u64 = 30;

/// Application's configuration
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    /// Path where the package store is kept.
    /// Default: $XDG_DATA_HOME/pkgdex/db
    pub db_path: Option<String>,

    /// Base URL that raw metadata files are fetched from.
    /// Default: https://raw.githubusercontent.com
    pub raw_content_base: Option<String>,

    /// Branch metadata files are read from.
    /// Default: main
    pub default_branch: Option<String>,

    /// Limits the number of results printed by a search.
    /// Default: 20
    pub search_limit: Option<usize>,

    /// HTTP request timeout in seconds.
    /// Default: 30
    pub http_timeout: Option<u64>,

    /// Repository manifests, synced in listed order.
    #[serde(default)]
    pub repositories: Vec<Repository>,
}

/// Location of the configuration file, `$PKGDEX_CONFIG` taking precedence.
pub fn default_config_path() -> PathBuf {
    match std::env::var("PKGDEX_CONFIG") {
        Ok(path_str) => PathBuf::from(path_str),
        Err(_) => xdg_config_home().join("pkgdex").join("config.toml"),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn default_config() -> Self {
        Self {
            db_path: Some(format!("{}/pkgdex/db", xdg_data_home().display())),
            raw_content_base: Some(DEFAULT_RAW_CONTENT_BASE.to_string()),
            default_branch: Some(DEFAULT_BRANCH.to_string()),
            search_limit: Some(DEFAULT_SEARCH_LIMIT),
            http_timeout: Some(DEFAULT_HTTP_TIMEOUT),
            repositories: vec![Repository::default_repository()],
        }
    }

    /// Loads the configuration from the default location.
    pub fn new() -> Result<Self> {
        Self::load(&default_config_path())
    }

    /// Loads the configuration from `path`.
    /// If the file does not exist, the default configuration is used.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                Self::default_config()
            }
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.resolve()?;

        Ok(config)
    }

    /// Validates repositories and fills in unset values.
    pub fn resolve(&mut self) -> Result<()> {
        self.raw_content_base
            .get_or_insert_with(|| DEFAULT_RAW_CONTENT_BASE.to_string());
        self.default_branch
            .get_or_insert_with(|| DEFAULT_BRANCH.to_string());
        self.search_limit.get_or_insert(DEFAULT_SEARCH_LIMIT);
        self.http_timeout.get_or_insert(DEFAULT_HTTP_TIMEOUT);

        let mut seen_repos = HashSet::new();

        for repo in &self.repositories {
            repo.validate()?;
            if !seen_repos.insert(&repo.name) {
                return Err(ConfigError::DuplicateRepositoryName(repo.name.clone()));
            }
        }

        Ok(())
    }

    pub fn get_db_path(&self) -> Result<PathBuf> {
        if let Ok(env_path) = std::env::var("PKGDEX_DB") {
            return Ok(resolve_path(&env_path)?);
        }
        if let Some(db_path) = &self.db_path {
            return Ok(resolve_path(db_path)?);
        }
        Ok(xdg_data_home().join("pkgdex").join("db"))
    }

    pub fn raw_content_base(&self) -> &str {
        self.raw_content_base
            .as_deref()
            .unwrap_or(DEFAULT_RAW_CONTENT_BASE)
            .trim_end_matches('/')
    }

    pub fn default_branch(&self) -> &str {
        self.default_branch.as_deref().unwrap_or(DEFAULT_BRANCH)
    }

    pub fn search_limit(&self) -> usize {
        self.search_limit.unwrap_or(DEFAULT_SEARCH_LIMIT)
    }

    pub fn http_timeout(&self) -> u64 {
        self.http_timeout.unwrap_or(DEFAULT_HTTP_TIMEOUT)
    }

    pub fn get_repository(&self, name: &str) -> Option<&Repository> {
        self.repositories.iter().find(|repo| repo.name == name)
    }

    /// Adds a repository, replacing the location of an existing one with the
    /// same name in place. Returns `true` when an entry was replaced.
    pub fn add_repository(&mut self, repo: Repository) -> Result<bool> {
        repo.validate()?;

        if let Some(existing) = self.repositories.iter_mut().find(|r| r.name == repo.name) {
            existing.location = repo.location;
            return Ok(true);
        }

        self.repositories.push(repo);
        Ok(false)
    }

    pub fn remove_repository(&mut self, name: &str) -> Result<Repository> {
        let index = self
            .repositories
            .iter()
            .position(|repo| repo.name == name)
            .ok_or_else(|| ConfigError::RepositoryNotFound(name.to_string()))?;

        Ok(self.repositories.remove(index))
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let serialized = self.to_toml()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serialized)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// Writes the default configuration to `path`, refusing to overwrite.
pub fn generate_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(ConfigError::ConfigAlreadyExists(
            path.display().to_string(),
        ));
    }

    Config::default_config().save(path)?;
    info!("Default configuration file generated at: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use serial_test::serial;
    use tempfile::tempdir;

    use super::*;
    use crate::{repository::DEFAULT_REPOSITORY_NAME, test_utils::with_env};

    #[test]
    fn test_default_config_creation() {
        let config = Config::default_config();

        assert_eq!(config.repositories.len(), 1);
        assert_eq!(config.repositories[0].name, DEFAULT_REPOSITORY_NAME);
        assert_eq!(config.raw_content_base(), DEFAULT_RAW_CONTENT_BASE);
        assert_eq!(config.default_branch(), "main");
        assert_eq!(config.search_limit, Some(20));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.repositories[0].name, DEFAULT_REPOSITORY_NAME);
    }

    #[test]
    fn test_load_fills_unset_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
            [[repositories]]
            name = "r1"
            url = "//example.com/m.json"
            "#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.repositories.len(), 1);
        assert_eq!(config.repositories[0].location, "//example.com/m.json");
        assert_eq!(config.default_branch(), "main");
        assert_eq!(config.http_timeout, Some(DEFAULT_HTTP_TIMEOUT));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "repositories = [").unwrap();

        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::TomlDeError(_))
        ));
    }

    #[test]
    fn test_config_resolve_duplicate_repo() {
        let mut config = Config::default_config();
        config.repositories.push(Repository::default_repository());

        assert!(matches!(
            config.resolve(),
            Err(ConfigError::DuplicateRepositoryName(name)) if name == DEFAULT_REPOSITORY_NAME
        ));
    }

    #[test]
    fn test_add_repository_replaces_existing_location() {
        let mut config = Config::default_config();

        let replaced = config
            .add_repository(Repository::new("r1", "//a.example/m.json"))
            .unwrap();
        assert!(!replaced);
        assert_eq!(config.repositories.len(), 2);

        let replaced = config
            .add_repository(Repository::new("r1", "//b.example/m.json"))
            .unwrap();
        assert!(replaced);
        assert_eq!(config.repositories.len(), 2);
        assert_eq!(
            config.get_repository("r1").unwrap().location,
            "//b.example/m.json"
        );
        assert_eq!(config.repositories[1].name, "r1");
    }

    #[test]
    fn test_remove_repository() {
        let mut config = Config::default_config();

        let removed = config.remove_repository(DEFAULT_REPOSITORY_NAME).unwrap();
        assert_eq!(removed.name, DEFAULT_REPOSITORY_NAME);
        assert!(config.repositories.is_empty());

        assert!(matches!(
            config.remove_repository(DEFAULT_REPOSITORY_NAME),
            Err(ConfigError::RepositoryNotFound(_))
        ));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default_config();
        config.search_limit = Some(5);
        config
            .add_repository(Repository::new("r1", "https://example.com/m.yaml"))
            .unwrap();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.search_limit, Some(5));
        assert_eq!(loaded.repositories, config.repositories);
    }

    #[test]
    fn test_generate_default_config_refuses_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        generate_default_config(&path).unwrap();
        assert!(path.exists());
        assert!(matches!(
            generate_default_config(&path),
            Err(ConfigError::ConfigAlreadyExists(_))
        ));
    }

    #[test]
    #[serial]
    fn test_get_db_path_env_override() {
        with_env(vec![("PKGDEX_DB", "/tmp/pkgdex-test-db")], || {
            let config = Config::default_config();
            assert_eq!(
                config.get_db_path().unwrap(),
                PathBuf::from("/tmp/pkgdex-test-db")
            );
        });
    }

    #[test]
    #[serial]
    fn test_default_config_path_env_override() {
        with_env(vec![("PKGDEX_CONFIG", "/tmp/pkgdex.toml")], || {
            assert_eq!(default_config_path(), PathBuf::from("/tmp/pkgdex.toml"));
        });
    }

    #[test]
    fn test_raw_content_base_trims_trailing_slash() {
        let mut config = Config::default_config();
        config.raw_content_base = Some("http://127.0.0.1:8080/".to_string());
        assert_eq!(config.raw_content_base(), "http://127.0.0.1:8080");
    }
}
