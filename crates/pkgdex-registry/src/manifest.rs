//! Manifest parsing and include resolution.
//!
//! A manifest is a JSON or YAML document of the form
//!
//! ```yaml
//! packages:
//!   some-package: github:owner/repo
//! include:
//!   - ./more.yaml
//!   - //other.host/manifest.json
//! ```
//!
//! Resolving a manifest flattens its include graph into one ordered
//! name -> source location mapping.

use indexmap::IndexMap;
use pkgdex_dl::fetch::Fetcher;
use pkgdex_events::{EventSink, Failure};
use serde::{de::IgnoredAny, Deserialize, Deserializer};
use tracing::{debug, trace};

use crate::{
    error::{RegistryError, Result},
    location::{normalize_location, resolve_include},
};

/// Flat package name -> source location mapping, in insertion order.
pub type PackageMap = IndexMap<String, String>;

/// A single parsed manifest, before its includes are resolved.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    #[serde(default, deserialize_with = "null_is_empty")]
    pub packages: PackageMap,

    #[serde(default, deserialize_with = "lenient_includes")]
    pub include: Vec<String>,
}

fn null_is_empty<'de, D>(deserializer: D) -> std::result::Result<PackageMap, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<PackageMap>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IncludeEntry {
    Location(String),
    Other(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Includes {
    List(Vec<IncludeEntry>),
    Other(IgnoredAny),
}

/// Accepts a sequence of strings. Non-string entries are dropped and a
/// non-sequence value counts as no includes.
fn lenient_includes<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let includes = match Includes::deserialize(deserializer)? {
        Includes::List(entries) => {
            entries
                .into_iter()
                .filter_map(|entry| {
                    match entry {
                        IncludeEntry::Location(location) => Some(location),
                        IncludeEntry::Other(_) => None,
                    }
                })
                .collect()
        }
        Includes::Other(_) => Vec::new(),
    };
    Ok(includes)
}

fn is_yaml(text: &str) -> bool {
    let text = text.trim_start();
    text.starts_with("---") || text.starts_with("%YAML")
}

/// Parses the first YAML document of `text`.
pub(crate) fn first_yaml_document<T>(text: &str) -> std::result::Result<Option<T>, serde_yaml::Error>
where
    T: for<'de> Deserialize<'de>,
{
    match serde_yaml::Deserializer::from_str(text).next() {
        Some(document) => Option::<T>::deserialize(document),
        None => Ok(None),
    }
}

/// Parses manifest text.
///
/// Text starting with `---` or `%YAML` is read as YAML (first document only),
/// anything else as JSON. An empty document is an empty manifest.
pub fn parse_manifest(text: &str) -> Result<Manifest> {
    let manifest = if is_yaml(text) {
        first_yaml_document::<Manifest>(text)?
    } else {
        serde_json::from_str::<Option<Manifest>>(text)?
    };
    Ok(manifest.unwrap_or_default())
}

struct Frame {
    location: String,
    includes: std::vec::IntoIter<String>,
    own: PackageMap,
    merged: PackageMap,
}

impl Frame {
    fn new(location: String, manifest: Manifest) -> Self {
        Self {
            location,
            includes: manifest.include.into_iter(),
            own: manifest.packages,
            merged: PackageMap::new(),
        }
    }

    fn finish(mut self) -> PackageMap {
        self.merged.extend(self.own);
        self.merged
    }
}

/// Resolves a repository manifest and its includes into one [`PackageMap`].
///
/// Includes merge depth first in listed order, later includes overriding
/// earlier ones, and a manifest's own packages override all of its includes.
/// Every failure degrades the affected manifest to an empty one and is
/// reported to the event sink.
pub struct ManifestResolver<'a> {
    fetcher: &'a dyn Fetcher,
    events: &'a dyn EventSink,
}

impl<'a> ManifestResolver<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, events: &'a dyn EventSink) -> Self {
        Self {
            fetcher,
            events,
        }
    }

    pub async fn resolve(&self, location: &str) -> PackageMap {
        let root = normalize_location(location);
        let mut stack = vec![self.load(root)];

        loop {
            let next = stack
                .last_mut()
                .and_then(|frame| frame.includes.next().map(|entry| (frame.location.clone(), entry)));

            match next {
                Some((parent, entry)) => {
                    let child = match resolve_include(&parent, &entry) {
                        Ok(child) => normalize_location(&child),
                        Err(err) => {
                            self.report(&entry, &err);
                            continue;
                        }
                    };

                    if stack.iter().any(|frame| frame.location == child) {
                        let mut chain: Vec<String> =
                            stack.iter().map(|frame| frame.location.clone()).collect();
                        chain.push(child.clone());
                        let err = RegistryError::CyclicInclude {
                            location: child.clone(),
                            chain,
                        };
                        self.report(&child, &err);
                        continue;
                    }

                    trace!(parent = %parent, include = %child, "resolving include");
                    let frame = self.load(child);
                    stack.push(frame);
                }
                None => {
                    let Some(done) = stack.pop() else {
                        return PackageMap::new();
                    };
                    let packages = done.finish();
                    match stack.last_mut() {
                        Some(parent) => parent.merged.extend(packages),
                        None => return packages,
                    }
                }
            }
        }
    }

    fn load(&self, location: String) -> Frame {
        match self.fetch_manifest(&location) {
            Ok(manifest) => {
                debug!(
                    location = %location,
                    packages = manifest.packages.len(),
                    includes = manifest.include.len(),
                    "fetched manifest"
                );
                Frame::new(location, manifest)
            }
            Err(err) => {
                self.report(&location, &err);
                Frame::new(location, Manifest::default())
            }
        }
    }

    fn fetch_manifest(&self, location: &str) -> Result<Manifest> {
        let text = self.fetcher.fetch_text(location)?;
        parse_manifest(&text)
    }

    fn report(&self, subject: &str, err: &RegistryError) {
        debug!(subject, kind = %err.kind(), "{err}");
        self.events
            .report(Failure::new(err.kind(), subject, err.to_string()));
    }
}
