use pkgdex_config::repository::Repository;
use pkgdex_db::PackageStore;
use pkgdex_events::{EventSink, Failure, PkgdexEvent, SyncStage};
use pkgdex_registry::{enrich, ManifestResolver, MetadataSource, RepoInfo};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::{
    error::OperationResult, PkgdexContext, RepoSyncReport, SkippedPackage, SyncReport,
};

/// Syncs `repositories` into the package store, in order.
///
/// Starting a sync supersedes any sync still running on the same context:
/// the older pass stops at its next checkpoint and returns a cancelled
/// report, and this pass waits until it has released the store.
///
/// # Errors
///
/// Fails only when the store cannot be opened or written. Network and parse
/// failures are reported through the event sink and degrade the affected
/// repository or package.
pub async fn sync_all(
    ctx: &PkgdexContext,
    repositories: &[Repository],
) -> OperationResult<SyncReport> {
    let token = ctx.begin_sync();
    let _gate = ctx.acquire_sync_gate().await;
    debug!(repos = repositories.len(), "starting sync");

    let store = ctx.store()?;
    let source = ctx.metadata_source();
    let mut report = SyncReport::default();

    for repo in repositories {
        if token.is_cancelled() {
            emit_stage(ctx, &repo.name, SyncStage::Cancelled);
            report.cancelled = true;
            break;
        }

        let repo_report = sync_repository(ctx, store, &source, repo, &token).await?;
        let cancelled = repo_report.cancelled;
        report.repositories.push(repo_report);

        if cancelled {
            report.cancelled = true;
            break;
        }
    }

    debug!(
        written = report.total_written(),
        skipped = report.total_skipped(),
        cancelled = report.cancelled,
        "sync finished"
    );
    Ok(report)
}

async fn sync_repository(
    ctx: &PkgdexContext,
    store: &PackageStore,
    source: &MetadataSource,
    repo: &Repository,
    token: &CancellationToken,
) -> OperationResult<RepoSyncReport> {
    let events = ctx.events().as_ref();
    let fetcher = ctx.fetcher().as_ref();
    let repo_info = RepoInfo::new(&repo.name, &repo.location);
    let mut report = RepoSyncReport {
        repo_name: repo.name.clone(),
        location: repo.location.clone(),
        ..Default::default()
    };

    emit_stage(ctx, &repo.name, SyncStage::Resolving);
    let packages = ManifestResolver::new(fetcher, events)
        .resolve(&repo.location)
        .await;
    report.resolved = packages.len();
    trace!(repo_name = %repo.name, packages = packages.len(), "manifest resolved");

    emit_stage(
        ctx,
        &repo.name,
        SyncStage::FetchingMetadata {
            package_count: packages.len() as u32,
        },
    );

    let total = packages.len() as u32;
    let mut records = Vec::with_capacity(packages.len());

    for (index, (name, location)) in packages.iter().enumerate() {
        if token.is_cancelled() {
            return Ok(cancelled(ctx, report));
        }

        match enrich(fetcher, events, source, &repo_info, name, location).await {
            Ok(record) => records.push(record),
            Err(err) => {
                debug!(repo_name = %repo.name, package = %name, "skipping package: {err}");
                events.report(Failure::new(err.kind(), name, err.to_string()));
                report.skipped.push(SkippedPackage {
                    name: name.clone(),
                    reason: err.to_string(),
                });
            }
        }

        events.emit(PkgdexEvent::BatchProgress {
            repo_name: repo.name.clone(),
            completed: index as u32 + 1,
            total,
            skipped: report.skipped.len() as u32,
        });
    }

    if token.is_cancelled() {
        return Ok(cancelled(ctx, report));
    }

    emit_stage(ctx, &repo.name, SyncStage::WritingStore);
    store.upsert_all(&records)?;
    report.written = records.len();

    emit_stage(
        ctx,
        &repo.name,
        SyncStage::Complete {
            package_count: report.written as u32,
            skipped: report.skipped.len() as u32,
        },
    );

    Ok(report)
}

fn cancelled(ctx: &PkgdexContext, mut report: RepoSyncReport) -> RepoSyncReport {
    debug!(repo_name = %report.repo_name, "sync superseded, nothing written");
    emit_stage(ctx, &report.repo_name, SyncStage::Cancelled);
    report.cancelled = true;
    report
}

fn emit_stage(ctx: &PkgdexContext, repo_name: &str, stage: SyncStage) {
    ctx.events().emit(PkgdexEvent::SyncProgress {
        repo_name: repo_name.to_string(),
        stage,
    });
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, OnceLock, Weak};

    use pkgdex_config::config::Config;
    use pkgdex_dl::{
        error::Result as FetchResult,
        fetch::{Fetcher, MemoryFetcher},
    };
    use pkgdex_events::{CollectorSink, FailureKind};

    use super::*;
    use crate::{
        error::OperationError,
        search::{find_by_name, search},
    };

    const RAW: &str = "https://raw.githubusercontent.com";

    fn context(fetcher: Arc<dyn Fetcher>, sink: Arc<CollectorSink>) -> PkgdexContext {
        PkgdexContext::new(Config::default_config(), sink)
            .with_fetcher(fetcher)
            .with_store(PackageStore::open_in_memory().unwrap())
    }

    #[tokio::test]
    async fn test_sync_then_search_end_to_end() {
        let fetcher = Arc::new(
            MemoryFetcher::new()
                .with_body(
                    "https://h/m.json",
                    r#"{"packages": {"pkgA": "github:own/pkgA"}}"#,
                )
                .with_body(
                    format!("{RAW}/own/pkgA/main/package.json"),
                    r#"{"keywords": ["net"]}"#,
                ),
        );
        let sink = Arc::new(CollectorSink::default());
        let ctx = context(fetcher, sink.clone());

        let report = sync_all(&ctx, &[Repository::new("r1", "//h/m.json")])
            .await
            .unwrap();
        assert!(!report.cancelled);
        assert_eq!(report.total_written(), 1);

        let result = search(&ctx, "net", None).await.unwrap();
        assert_eq!(result.packages.len(), 1);
        let pkg = &result.packages[0];
        assert_eq!(pkg.name, "pkgA");
        assert_eq!(pkg.repo.name, "r1");
        assert!(pkg.readme_md.is_none());
        assert!(pkg.app_yaml.is_none());

        assert!(search(&ctx, "missing", None).await.unwrap().packages.is_empty());
        assert!(search(&ctx, "", None).await.unwrap().packages.is_empty());
        assert_eq!(search(&ctx, "*", None).await.unwrap().packages.len(), 1);
        assert!(find_by_name(&ctx, "pkgA").await.unwrap().is_some());

        let stages: Vec<_> = sink
            .events()
            .into_iter()
            .filter_map(|event| {
                match event {
                    PkgdexEvent::SyncProgress { stage, .. } => Some(stage),
                    _ => None,
                }
            })
            .collect();
        assert_eq!(
            stages,
            vec![
                SyncStage::Resolving,
                SyncStage::FetchingMetadata { package_count: 1 },
                SyncStage::WritingStore,
                SyncStage::Complete {
                    package_count: 1,
                    skipped: 0,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_malformed_source_is_skipped_and_reported() {
        let fetcher = Arc::new(MemoryFetcher::new().with_body(
            "https://h/m.json",
            r#"{"packages": {"good": "github:o/good", "bad": "npm:bad"}}"#,
        ));
        let sink = Arc::new(CollectorSink::default());
        let ctx = context(fetcher, sink.clone());

        let report = sync_all(&ctx, &[Repository::new("r1", "https://h/m.json")])
            .await
            .unwrap();

        let repo = &report.repositories[0];
        assert_eq!(repo.resolved, 2);
        assert_eq!(repo.written, 1);
        assert_eq!(repo.skipped.len(), 1);
        assert_eq!(repo.skipped[0].name, "bad");

        let malformed = sink.failures_of(FailureKind::MalformedSourceLocation);
        assert_eq!(malformed.len(), 1);
        assert_eq!(malformed[0].subject, "bad");
        assert!(find_by_name(&ctx, "bad").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_later_repository_overwrites_same_name() {
        let fetcher = Arc::new(
            MemoryFetcher::new()
                .with_body("https://a/m.json", r#"{"packages": {"p": "github:a/p"}}"#)
                .with_body("https://b/m.json", r#"{"packages": {"p": "github:b/p"}}"#)
                .with_body(format!("{RAW}/a/p/main/README.md"), "# from a"),
        );
        let sink = Arc::new(CollectorSink::default());
        let ctx = context(fetcher, sink);

        sync_all(
            &ctx,
            &[
                Repository::new("ra", "//a/m.json"),
                Repository::new("rb", "//b/m.json"),
            ],
        )
        .await
        .unwrap();

        let stored = find_by_name(&ctx, "p").await.unwrap().unwrap();
        assert_eq!(stored.repo.name, "rb");
        assert_eq!(stored.url, "github:b/p");
        assert!(stored.readme_md.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_manifest_writes_nothing_but_continues() {
        let fetcher = Arc::new(
            MemoryFetcher::new()
                .with_status("https://down/m.json", 503)
                .with_body("https://up/m.json", r#"{"packages": {"q": "github:o/q"}}"#),
        );
        let sink = Arc::new(CollectorSink::default());
        let ctx = context(fetcher, sink.clone());

        let report = sync_all(
            &ctx,
            &[
                Repository::new("down", "//down/m.json"),
                Repository::new("up", "//up/m.json"),
            ],
        )
        .await
        .unwrap();

        assert_eq!(report.repositories.len(), 2);
        assert_eq!(report.repositories[0].written, 0);
        assert_eq!(report.repositories[1].written, 1);
        assert!(sink
            .failures_of(FailureKind::Network)
            .iter()
            .any(|failure| failure.subject == "https://down/m.json"));
    }

    #[tokio::test]
    async fn test_store_unavailable_is_returned_and_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file").unwrap();

        let mut config = Config::default_config();
        config.db_path = Some(blocker.join("db").display().to_string());

        let fetcher = Arc::new(MemoryFetcher::new());
        let sink = Arc::new(CollectorSink::default());
        let ctx = PkgdexContext::new(config, sink.clone()).with_fetcher(fetcher.clone());

        let result = sync_all(&ctx, &[Repository::new("r1", "//h/m.json")]).await;
        assert!(matches!(result, Err(OperationError::StoreUnavailable { .. })));
        assert!(fetcher.requests().is_empty());

        assert!(matches!(
            search(&ctx, "x", None).await,
            Err(OperationError::StoreUnavailable { .. })
        ));
        assert_eq!(sink.failures_of(FailureKind::StoreUnavailable).len(), 2);
    }

    /// Cancels the context's running sync when `trigger` is fetched.
    struct CancellingFetcher {
        inner: MemoryFetcher,
        trigger: String,
        ctx: OnceLock<Weak<PkgdexContext>>,
    }

    impl Fetcher for CancellingFetcher {
        fn fetch_text(&self, url: &str) -> FetchResult<String> {
            if url == self.trigger {
                if let Some(ctx) = self.ctx.get().and_then(Weak::upgrade) {
                    ctx.cancel_sync();
                }
            }
            self.inner.fetch_text(url)
        }
    }

    #[tokio::test]
    async fn test_cancelled_sync_writes_nothing() {
        let fetcher = Arc::new(CancellingFetcher {
            inner: MemoryFetcher::new()
                .with_body(
                    "https://h/m.json",
                    r#"{"packages": {"a": "github:o/a", "b": "github:o/b"}}"#,
                )
                .with_body("https://h/next.json", r#"{"packages": {"c": "github:o/c"}}"#),
            trigger: format!("{RAW}/o/a/main/README.md"),
            ctx: OnceLock::new(),
        });
        let sink = Arc::new(CollectorSink::default());
        let ctx = Arc::new(context(fetcher.clone(), sink.clone()));
        let _ = fetcher.ctx.set(Arc::downgrade(&ctx));

        let report = sync_all(
            &ctx,
            &[
                Repository::new("r1", "//h/m.json"),
                Repository::new("r2", "//h/next.json"),
            ],
        )
        .await
        .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.repositories.len(), 1);
        assert!(report.repositories[0].cancelled);
        assert_eq!(report.total_written(), 0);
        assert_eq!(ctx.store().unwrap().count().unwrap(), 0);
        assert_eq!(fetcher.inner.request_count("https://h/next.json"), 0);
        assert_eq!(fetcher.inner.request_count(&format!("{RAW}/o/b/main/app.yaml")), 0);

        // A fresh pass is not affected by the earlier cancellation.
        let report = sync_all(&ctx, &[Repository::new("r2", "//h/next.json")])
            .await
            .unwrap();
        assert!(!report.cancelled);
        assert_eq!(ctx.store().unwrap().count().unwrap(), 1);
    }
}
