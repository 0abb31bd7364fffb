use pkgdex_registry::PackageRecord;
use tracing::{debug, trace};

use crate::{error::OperationResult, PkgdexContext, SearchResult};

/// A parsed search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// Blank term: matches nothing.
    Empty,
    /// `*`: matches everything.
    All,
    /// Lowercased needle matched against names and keywords.
    Substring(String),
}

impl SearchQuery {
    pub fn parse(term: &str) -> Self {
        match term.trim() {
            "" => Self::Empty,
            "*" => Self::All,
            needle => Self::Substring(needle.to_lowercase()),
        }
    }

    pub fn matches(&self, record: &PackageRecord) -> bool {
        match self {
            Self::Empty => false,
            Self::All => true,
            Self::Substring(needle) => {
                record.name.to_lowercase().contains(needle)
                    || record
                        .keywords()
                        .iter()
                        .any(|keyword| keyword.to_lowercase().contains(needle))
            }
        }
    }
}

/// Searches the store for `term`.
///
/// Matches keep store order (by name). `limit` caps the returned packages;
/// `total_count` is the number of matches before the cap.
pub async fn search(
    ctx: &PkgdexContext,
    term: &str,
    limit: Option<usize>,
) -> OperationResult<SearchResult> {
    let query = SearchQuery::parse(term);
    debug!(query = ?query, limit = ?limit, "searching packages");

    if query == SearchQuery::Empty {
        return Ok(SearchResult::default());
    }

    let records = ctx.store()?.scan_all()?;
    trace!(scanned = records.len(), "scanned store");

    let matches: Vec<PackageRecord> = records
        .into_iter()
        .filter(|record| query.matches(record))
        .collect();
    let total_count = matches.len();

    let packages = match limit {
        Some(limit) => matches.into_iter().take(limit).collect(),
        None => matches,
    };

    Ok(SearchResult {
        packages,
        total_count,
    })
}

/// Looks up one package by exact name.
pub async fn find_by_name(
    ctx: &PkgdexContext,
    name: &str,
) -> OperationResult<Option<PackageRecord>> {
    debug!(name, "looking up package");
    Ok(ctx.store()?.find_by_name(name)?)
}
