//! Manifest resolution and package metadata for the pkgdex package index.
//!
//! # Overview
//!
//! A repository is described by a manifest (JSON or YAML) mapping package
//! names to `github:<owner>/<repo>` source locations. Manifests may include
//! other manifests. Syncing a repository means:
//!
//! 1. [`ManifestResolver::resolve`] flattens the include graph into one
//!    ordered mapping.
//! 2. [`enrich`] fetches the metadata files of every resolved package and
//!    produces a [`PackageRecord`].
//!
//! Failures along the way are reported to an [`pkgdex_events::EventSink`]
//! and never abort the whole repository.
//!
//! # Example
//!
//! ```no_run
//! use pkgdex_dl::fetch::HttpFetcher;
//! use pkgdex_events::NullSink;
//! use pkgdex_registry::{enrich, ManifestResolver, MetadataSource, RepoInfo};
//!
//! async fn index(location: &str) {
//!     let fetcher = HttpFetcher;
//!     let sink = NullSink;
//!     let repo = RepoInfo::new("rewpkgs", location);
//!
//!     let packages = ManifestResolver::new(&fetcher, &sink).resolve(location).await;
//!     for (name, source) in &packages {
//!         if let Ok(record) =
//!             enrich(&fetcher, &sink, &MetadataSource::default(), &repo, name, source).await
//!         {
//!             println!("{} {:?}", record.name, record.keywords());
//!         }
//!     }
//! }
//! ```

pub mod error;
pub mod location;
pub mod manifest;
pub mod metadata;
pub mod package;

pub use error::{RegistryError, Result};
pub use location::{normalize_location, resolve_include};
pub use manifest::{parse_manifest, Manifest, ManifestResolver, PackageMap};
pub use metadata::{enrich, GithubSource, MetadataSource, METADATA_FILES};
pub use package::{PackageDescriptor, PackageRecord, RepoInfo};
