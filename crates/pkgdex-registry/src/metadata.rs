//! Per-package metadata acquisition.
//!
//! Packages hosted on GitHub publish up to three metadata files at the root
//! of their default branch: `app.yaml`, `package.json` and `README.md`. Each
//! file is optional; whatever can be fetched is attached to the record.

use std::{fmt, str::FromStr, sync::LazyLock};

use pkgdex_dl::fetch::Fetcher;
use pkgdex_events::{EventSink, Failure, FailureKind, LogLevel};
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, trace};

use crate::{
    error::{RegistryError, Result},
    manifest::first_yaml_document,
    package::{PackageRecord, RepoInfo},
};

pub const APP_YAML: &str = "app.yaml";
pub const PACKAGE_JSON: &str = "package.json";
pub const README_MD: &str = "README.md";

/// Metadata files, in fetch order.
pub const METADATA_FILES: [&str; 3] = [APP_YAML, PACKAGE_JSON, README_MD];

pub const DEFAULT_RAW_BASE: &str = "https://raw.githubusercontent.com";
pub const DEFAULT_BRANCH: &str = "main";

static GITHUB_SOURCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^github:([^/]+)/(.+)$").expect("github source pattern is valid")
});

/// Where raw metadata files are served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataSource {
    pub raw_base: String,
    pub branch: String,
}

impl Default for MetadataSource {
    fn default() -> Self {
        Self {
            raw_base: DEFAULT_RAW_BASE.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
        }
    }
}

impl MetadataSource {
    pub fn new(raw_base: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            raw_base: raw_base.into().trim_end_matches('/').to_string(),
            branch: branch.into(),
        }
    }
}

/// A `github:<owner>/<repo>` source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubSource {
    pub owner: String,
    pub repo: String,
}

impl FromStr for GithubSource {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        let caps = GITHUB_SOURCE_RE
            .captures(s)
            .ok_or_else(|| RegistryError::MalformedSourceLocation(s.to_string()))?;

        Ok(Self {
            owner: caps[1].to_string(),
            repo: caps[2].to_string(),
        })
    }
}

impl fmt::Display for GithubSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "github:{}/{}", self.owner, self.repo)
    }
}

impl GithubSource {
    pub fn raw_url(&self, source: &MetadataSource, path: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            source.raw_base, self.owner, self.repo, source.branch, path
        )
    }

    pub fn web_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.repo)
    }
}

#[derive(Deserialize)]
struct AppAssets {
    icon: Option<String>,
}

#[derive(Deserialize)]
struct AppManifest {
    assets: Option<AppAssets>,
    icon: Option<String>,
}

/// Icon path declared by `app.yaml`: `assets.icon`, falling back to `icon`.
fn declared_icon(app_yaml: &str) -> Option<String> {
    let app = first_yaml_document::<AppManifest>(app_yaml).ok().flatten()?;
    app.assets
        .and_then(|assets| assets.icon)
        .or(app.icon)
        .filter(|icon| !icon.trim().is_empty())
}

fn icon_url(github: &GithubSource, source: &MetadataSource, icon: &str) -> String {
    if icon.starts_with("http://") || icon.starts_with("https://") {
        return icon.to_string();
    }

    let mut path = icon.trim();
    loop {
        if let Some(rest) = path.strip_prefix("./") {
            path = rest;
        } else if let Some(rest) = path.strip_prefix('/') {
            path = rest;
        } else {
            break;
        }
    }
    github.raw_url(source, path)
}

/// Builds the record for one resolved package.
///
/// Individual file failures omit that file and are reported at debug level.
///
/// # Errors
///
/// [`RegistryError::MalformedSourceLocation`] if `source_location` is not a
/// `github:<owner>/<repo>` location.
pub async fn enrich(
    fetcher: &dyn Fetcher,
    events: &dyn EventSink,
    source: &MetadataSource,
    repo: &RepoInfo,
    name: &str,
    source_location: &str,
) -> Result<PackageRecord> {
    let github: GithubSource = source_location.parse()?;
    let mut record = PackageRecord::new(name, repo.clone(), source_location);

    for file in METADATA_FILES {
        let url = github.raw_url(source, file);
        let content = match fetcher.fetch_text(&url) {
            Ok(content) if !content.is_empty() => content,
            Ok(_) => {
                trace!(package = name, url = %url, "empty metadata file");
                continue;
            }
            Err(err) => {
                debug!(package = name, url = %url, "metadata file unavailable: {err}");
                events.report(
                    Failure::new(FailureKind::Network, url, err.to_string())
                        .with_level(LogLevel::Debug),
                );
                continue;
            }
        };

        match file {
            APP_YAML => record.app_yaml = Some(content),
            PACKAGE_JSON => record.package_json = Some(content),
            _ => record.readme_md = Some(content),
        }
    }

    record.icon = record
        .app_yaml
        .as_deref()
        .and_then(declared_icon)
        .map(|icon| icon_url(&github, source, &icon));

    trace!(
        package = name,
        app_yaml = record.app_yaml.is_some(),
        package_json = record.package_json.is_some(),
        readme = record.readme_md.is_some(),
        "enriched package"
    );

    Ok(record)
}
