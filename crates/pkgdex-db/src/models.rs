use diesel::prelude::*;
use pkgdex_registry::{PackageRecord, RepoInfo};

use crate::schema::packages;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = packages)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PackageRow {
    pub name: String,
    pub repo_name: String,
    pub repo_location: String,
    pub url: String,
    pub app_yaml: Option<String>,
    pub package_json: Option<String>,
    pub readme: Option<String>,
    pub icon: Option<String>,
}

/// Row written by `REPLACE INTO`. `None` is stored as `NULL`, so a field the
/// new record lacks is cleared.
#[derive(Insertable)]
#[diesel(table_name = packages)]
#[diesel(treat_none_as_default_value = false)]
pub struct NewPackageRow<'a> {
    pub name: &'a str,
    pub repo_name: &'a str,
    pub repo_location: &'a str,
    pub url: &'a str,
    pub app_yaml: Option<&'a str>,
    pub package_json: Option<&'a str>,
    pub readme: Option<&'a str>,
    pub icon: Option<&'a str>,
}

impl From<PackageRow> for PackageRecord {
    fn from(row: PackageRow) -> Self {
        Self {
            name: row.name,
            repo: RepoInfo::new(row.repo_name, row.repo_location),
            url: row.url,
            app_yaml: row.app_yaml,
            package_json: row.package_json,
            readme_md: row.readme,
            icon: row.icon,
        }
    }
}

impl<'a> From<&'a PackageRecord> for NewPackageRow<'a> {
    fn from(record: &'a PackageRecord) -> Self {
        Self {
            name: &record.name,
            repo_name: &record.repo.name,
            repo_location: &record.repo.location,
            url: &record.url,
            app_yaml: record.app_yaml.as_deref(),
            package_json: record.package_json.as_deref(),
            readme: record.readme_md.as_deref(),
            icon: record.icon.as_deref(),
        }
    }
}
