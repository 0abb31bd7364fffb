use pkgdex_registry::PackageRecord;

// ---- Sync ----

/// A package left out of a sync pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPackage {
    pub name: String,
    pub reason: String,
}

/// Outcome of syncing one repository.
#[derive(Debug, Clone, Default)]
pub struct RepoSyncReport {
    pub repo_name: String,
    pub location: String,
    /// Packages in the resolved manifest.
    pub resolved: usize,
    /// Records written to the store.
    pub written: usize,
    pub skipped: Vec<SkippedPackage>,
    /// The pass was superseded or interrupted before this repository was written.
    pub cancelled: bool,
}

/// Report returned after a sync pass.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub repositories: Vec<RepoSyncReport>,
    pub cancelled: bool,
}

impl SyncReport {
    pub fn total_written(&self) -> usize {
        self.repositories.iter().map(|repo| repo.written).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.repositories.iter().map(|repo| repo.skipped.len()).sum()
    }
}

// ---- Search ----

/// Search result with the match count before any limit was applied.
#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    pub packages: Vec<PackageRecord>,
    pub total_count: usize,
}

// ---- Repositories ----

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryChange {
    Added,
    /// An existing repository of the same name had its location replaced.
    Replaced,
}
