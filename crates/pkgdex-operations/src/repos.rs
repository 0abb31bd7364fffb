use pkgdex_config::repository::Repository;
use tracing::{debug, info};

use crate::{error::OperationResult, PkgdexContext, RepositoryChange};

/// Adds a repository, or replaces the location of an existing one with the
/// same name, and saves the configuration. Package data is untouched.
pub fn add_repository(
    ctx: &PkgdexContext,
    name: &str,
    location: &str,
) -> OperationResult<RepositoryChange> {
    let mut config = ctx.config_mut();
    let replaced = config.add_repository(Repository::new(name, location))?;

    if let Some(path) = ctx.config_path() {
        config.save(path)?;
    }

    let change = if replaced {
        RepositoryChange::Replaced
    } else {
        RepositoryChange::Added
    };
    info!(name, location, ?change, "repository saved");
    Ok(change)
}

/// Removes a repository and saves the configuration. Records already synced
/// from it stay in the store.
pub fn remove_repository(ctx: &PkgdexContext, name: &str) -> OperationResult<Repository> {
    let mut config = ctx.config_mut();
    let removed = config.remove_repository(name)?;

    if let Some(path) = ctx.config_path() {
        config.save(path)?;
    }

    debug!(name, "repository removed");
    Ok(removed)
}

pub fn list_repositories(ctx: &PkgdexContext) -> Vec<Repository> {
    ctx.config().repositories.clone()
}
