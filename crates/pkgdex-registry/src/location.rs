//! Repository location shorthand and include resolution.

use url::Url;

use crate::error::{RegistryError, Result};

/// Expands location shorthand.
///
/// `//.host/path` becomes `http://host/path`, `//host/path` becomes
/// `https://host/path`. Anything else is returned unchanged.
pub fn normalize_location(location: &str) -> String {
    if let Some(rest) = location.strip_prefix("//.") {
        format!("http://{rest}")
    } else if let Some(rest) = location.strip_prefix("//") {
        format!("https://{rest}")
    } else {
        location.to_string()
    }
}

/// Resolves an `include` entry of the manifest at `base`.
///
/// Entries starting with `.` are joined onto the normalized `base`; all
/// others are returned as-is and normalized when fetched.
pub fn resolve_include(base: &str, entry: &str) -> Result<String> {
    if !entry.starts_with('.') {
        return Ok(entry.to_string());
    }

    let base = normalize_location(base);
    let base_url = Url::parse(&base).map_err(|source| {
        RegistryError::InvalidUrl {
            location: base.clone(),
            source,
        }
    })?;

    base_url
        .join(entry)
        .map(String::from)
        .map_err(|source| {
            RegistryError::InvalidUrl {
                location: entry.to_string(),
                source,
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_location() {
        assert_eq!(normalize_location("//host/x.json"), "https://host/x.json");
        assert_eq!(normalize_location("//.host/x.json"), "http://host/x.json");
        assert_eq!(
            normalize_location("https://host/x.json"),
            "https://host/x.json"
        );
        assert_eq!(normalize_location("http://host/x"), "http://host/x");
        assert_eq!(normalize_location("relative/x"), "relative/x");
    }

    #[test]
    fn test_resolve_include_relative() {
        assert_eq!(
            resolve_include("https://host/repo/main.yaml", "./extra.yaml").unwrap(),
            "https://host/repo/extra.yaml"
        );
        assert_eq!(
            resolve_include("//host/repo/main.yaml", "../other/main.json").unwrap(),
            "https://host/other/main.json"
        );
        assert_eq!(
            resolve_include("//.host/a/b.json", "./c.json").unwrap(),
            "http://host/a/c.json"
        );
    }

    #[test]
    fn test_resolve_include_absolute_passthrough() {
        assert_eq!(
            resolve_include("https://host/main.yaml", "//other/m.json").unwrap(),
            "//other/m.json"
        );
    }

    #[test]
    fn test_resolve_include_invalid_base() {
        assert!(matches!(
            resolve_include("not-a-url", "./x.json"),
            Err(RegistryError::InvalidUrl { .. })
        ));
    }
}
