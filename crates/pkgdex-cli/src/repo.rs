use nu_ansi_term::Color::{Cyan, Green};
use pkgdex_operations::{repos, PkgdexContext, RepositoryChange};
use tracing::{info, warn};

use crate::{error::CliResult, utils::Colored};

pub fn add_repository(ctx: &PkgdexContext, name: &str, location: &str) -> CliResult<()> {
    let change = repos::add_repository(ctx, name, location)?;
    let verb = match change {
        RepositoryChange::Added => "Added",
        RepositoryChange::Replaced => "Updated",
    };
    info!("{verb} repository {} -> {location}", Colored(Cyan, name));
    info!("Run `pkgdex sync` to index its packages");
    Ok(())
}

pub fn remove_repository(ctx: &PkgdexContext, name: &str) -> CliResult<()> {
    let removed = repos::remove_repository(ctx, name)?;
    info!(
        "Removed repository {} ({}). Indexed packages stay until they are overwritten.",
        Colored(Cyan, &removed.name),
        removed.location
    );
    Ok(())
}

pub fn list_repositories(ctx: &PkgdexContext, json: bool) -> CliResult<()> {
    let repositories = repos::list_repositories(ctx);

    if json {
        println!("{}", serde_json::to_string_pretty(&repositories)?);
        return Ok(());
    }

    if repositories.is_empty() {
        warn!("No repositories configured");
        return Ok(());
    }

    for repo in &repositories {
        info!("{} {}", Colored(Green, &repo.name), repo.location);
    }
    Ok(())
}
