//! Package records and the views derived from their metadata files.

use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};

/// Literal body served by raw.githubusercontent.com for missing files.
const NOT_FOUND_BODY: &str = "404: Not Found";

/// The repository a package record was synced from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoInfo {
    pub name: String,
    #[serde(alias = "url")]
    pub location: String,
}

impl RepoInfo {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
        }
    }
}

/// One indexed package.
///
/// The raw metadata blobs keep the file names they were fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub name: String,
    pub repo: RepoInfo,
    /// Source location as listed in the manifest, e.g. `github:owner/repo`.
    pub url: String,

    #[serde(rename = "app.yaml", default, skip_serializing_if = "Option::is_none")]
    pub app_yaml: Option<String>,

    #[serde(rename = "package.json", default, skip_serializing_if = "Option::is_none")]
    pub package_json: Option<String>,

    #[serde(rename = "README.md", default, skip_serializing_if = "Option::is_none")]
    pub readme_md: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// The subset of `package.json` the index reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PackageDescriptor {
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "lenient_keywords")]
    pub keywords: Vec<String>,

    #[serde(default, deserialize_with = "lenient_repository")]
    pub repository: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Value(T),
    Other(IgnoredAny),
}

impl<T> Lenient<T> {
    fn into_option(self) -> Option<T> {
        match self {
            Lenient::Value(value) => Some(value),
            Lenient::Other(_) => None,
        }
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = Lenient::<String>::deserialize(deserializer)?.into_option();
    Ok(s.filter(|s| !s.is_empty()))
}

fn lenient_keywords<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Lenient::<Vec<Lenient<String>>>::deserialize(deserializer)?
        .into_option()
        .unwrap_or_default();
    Ok(entries.into_iter().filter_map(Lenient::into_option).collect())
}

#[derive(Deserialize)]
struct RepositoryField {
    #[serde(default, deserialize_with = "lenient_string")]
    url: Option<String>,
}

/// `repository` is either a URL string or an object with a `url` field.
fn lenient_repository<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repository {
        Url(String),
        Object(RepositoryField),
        Other(IgnoredAny),
    }

    Ok(match Repository::deserialize(deserializer)? {
        Repository::Url(url) => Some(url).filter(|u| !u.is_empty()),
        Repository::Object(field) => field.url,
        Repository::Other(_) => None,
    })
}

impl PackageRecord {
    pub fn new(name: impl Into<String>, repo: RepoInfo, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            repo,
            url: url.into(),
            app_yaml: None,
            package_json: None,
            readme_md: None,
            icon: None,
        }
    }

    /// Parsed `package.json`, if present and valid JSON.
    pub fn descriptor(&self) -> Option<PackageDescriptor> {
        self.package_json
            .as_deref()
            .and_then(|json| serde_json::from_str(json).ok())
    }

    pub fn keywords(&self) -> Vec<String> {
        self.descriptor()
            .map(|descriptor| descriptor.keywords)
            .unwrap_or_default()
    }

    pub fn description(&self) -> Option<String> {
        self.descriptor().and_then(|descriptor| descriptor.description)
    }

    /// Project homepage.
    ///
    /// A `git+https://...` style repository URL from `package.json` yields the
    /// text after the first `+`; otherwise the source location is turned into
    /// a GitHub URL.
    pub fn homepage(&self) -> Option<String> {
        let from_descriptor = self
            .descriptor()
            .and_then(|descriptor| descriptor.repository)
            .and_then(|url| url.split_once('+').map(|(_, rest)| rest.to_string()))
            .filter(|url| !url.is_empty());

        from_descriptor.or_else(|| {
            self.url
                .split_once(':')
                .map(|(_, path)| format!("https://github.com/{path}"))
        })
    }

    /// README text, unless the fetched body is the raw host's not-found page.
    pub fn readme(&self) -> Option<&str> {
        self.readme_md
            .as_deref()
            .filter(|readme| readme.trim() != NOT_FOUND_BODY)
    }

    /// Commands that install this package with the known frontends.
    pub fn install_hints(&self) -> Vec<String> {
        vec![
            format!("rew install @{}/{}", self.repo.name, self.name),
            format!("pimmy -Sa {}/{}", self.repo.name, self.name),
            format!("rew install {}", self.url),
        ]
    }
}
