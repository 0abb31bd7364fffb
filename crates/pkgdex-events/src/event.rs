use std::fmt;

/// All event types emitted while syncing and querying the package index.
#[derive(Debug, Clone)]
pub enum PkgdexEvent {
    /// Repository sync progress.
    SyncProgress { repo_name: String, stage: SyncStage },
    /// Metadata enrichment progress within one repository.
    BatchProgress {
        repo_name: String,
        completed: u32,
        total: u32,
        skipped: u32,
    },
    /// A non-fatal failure that was absorbed so the operation could continue,
    /// or a fatal one that is also returned to the caller.
    Failure(Failure),
    /// Log message.
    Log { level: LogLevel, message: String },
}

/// Repository sync stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStage {
    /// Fetching and merging the repository manifest and its includes.
    Resolving,
    /// Fetching per-package metadata files.
    FetchingMetadata { package_count: u32 },
    /// Writing the repository batch to the local store.
    WritingStore,
    /// Sync complete.
    Complete { package_count: u32, skipped: u32 },
    /// Superseded by a newer sync or interrupted before writing.
    Cancelled,
}

/// Classification of reported failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Fetch rejected or answered with a non-success status.
    Network,
    /// Malformed JSON/YAML manifest.
    Parse,
    /// A package source location does not follow `github:<owner>/<repo>`.
    MalformedSourceLocation,
    /// A manifest includes one of its own ancestors.
    CyclicInclude,
    /// The local store could not be opened or initialized.
    StoreUnavailable,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::Network => "network",
            FailureKind::Parse => "parse",
            FailureKind::MalformedSourceLocation => "malformed source location",
            FailureKind::CyclicInclude => "cyclic include",
            FailureKind::StoreUnavailable => "store unavailable",
        };
        f.write_str(label)
    }
}

/// A reported failure: what kind, what it concerns, and the underlying detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    /// Manifest location, package name, file URL or store path.
    pub subject: String,
    pub detail: String,
    /// How prominently a frontend should surface the failure.
    pub level: LogLevel,
}

impl Failure {
    pub fn new(kind: FailureKind, subject: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            subject: subject.into(),
            detail: detail.into(),
            level: LogLevel::Warning,
        }
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.subject, self.kind, self.detail)
    }
}

/// Log levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}
