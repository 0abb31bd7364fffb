//! Queries over the `packages` table.

use diesel::prelude::*;
use pkgdex_registry::PackageRecord;

use crate::{
    models::{NewPackageRow, PackageRow},
    schema::packages,
};

pub struct PackageRepository;

impl PackageRepository {
    /// Every package, ordered by name.
    pub fn list_all(conn: &mut SqliteConnection) -> QueryResult<Vec<PackageRow>> {
        packages::table
            .order(packages::name.asc())
            .select(PackageRow::as_select())
            .load(conn)
    }

    pub fn find_by_name(conn: &mut SqliteConnection, name: &str) -> QueryResult<Option<PackageRow>> {
        packages::table
            .filter(packages::name.eq(name))
            .select(PackageRow::as_select())
            .first(conn)
            .optional()
    }

    pub fn count(conn: &mut SqliteConnection) -> QueryResult<i64> {
        packages::table.count().get_result(conn)
    }

    /// Writes one record, replacing any row with the same name.
    pub fn replace(conn: &mut SqliteConnection, record: &PackageRecord) -> QueryResult<usize> {
        diesel::replace_into(packages::table)
            .values(NewPackageRow::from(record))
            .execute(conn)
    }
}
