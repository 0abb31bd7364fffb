use std::sync::Arc;

use nu_ansi_term::Color::{Cyan, Magenta};
use pkgdex_operations::{sync::sync_all, PkgdexContext};
use tracing::{debug, info, warn};

use crate::{error::CliResult, utils::Colored};

/// Syncs every configured repository. Ctrl-C cancels the pass; records
/// already written for earlier repositories are kept.
pub async fn sync_repositories(ctx: Arc<PkgdexContext>) -> CliResult<()> {
    let repositories = ctx.config().repositories.clone();
    if repositories.is_empty() {
        warn!("No repositories configured. Add one with `pkgdex repo add <name> <location>`");
        return Ok(());
    }

    let interrupt = {
        let ctx = Arc::clone(&ctx);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling sync");
                ctx.cancel_sync();
            }
        })
    };

    let result = sync_all(&ctx, &repositories).await;

    interrupt.abort();
    let _ = interrupt.await;

    let report = result?;

    for repo in &report.repositories {
        for skipped in &repo.skipped {
            debug!(package = %skipped.name, reason = %skipped.reason, "skipped");
        }
        if !repo.cancelled {
            info!(
                "[{}] Repository synced: {} packages",
                Colored(Magenta, &repo.repo_name),
                repo.written
            );
        }
    }

    if report.cancelled {
        warn!("Sync cancelled");
    } else {
        info!(
            "Indexed {} packages from {} repositories ({} skipped)",
            Colored(Cyan, report.total_written()),
            report.repositories.len(),
            report.total_skipped()
        );
    }

    Ok(())
}
