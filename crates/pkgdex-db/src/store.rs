//! The local package store.

use std::{
    fs,
    path::Path,
    sync::{Arc, Mutex},
};

use diesel::Connection as _;
use pkgdex_registry::PackageRecord;
use tracing::{debug, trace};

use crate::{
    connection::DbConnection,
    error::{DbError, ErrorContext, Result},
    repository::PackageRepository,
};

/// File name of the store inside the configured database directory.
pub const STORE_FILE_NAME: &str = "packages.db";

/// Thread-safe handle to the package table.
///
/// Clones share one connection.
#[derive(Clone)]
pub struct PackageStore {
    conn: Arc<Mutex<DbConnection>>,
}

impl PackageStore {
    /// Opens (creating if needed) the store file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating database directory {}", parent.display()))?;
        }

        let conn = DbConnection::open(path)?;
        debug!(path = %path.display(), "opened package store");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Arc::new(Mutex::new(DbConnection::open_in_memory()?)),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> diesel::QueryResult<T>,
    {
        let mut conn = self.conn.lock().map_err(|_| DbError::PoisonError)?;
        Ok(f(conn.conn())?)
    }

    fn transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> diesel::QueryResult<T>,
    {
        let mut conn = self.conn.lock().map_err(|_| DbError::PoisonError)?;
        Ok(conn.conn().transaction(f)?)
    }

    /// Writes a batch of records in one transaction, each replacing any
    /// existing record of the same name.
    pub fn upsert_all(&self, records: &[PackageRecord]) -> Result<usize> {
        let written = self.transaction(|conn| {
            let mut written = 0;
            for record in records {
                written += PackageRepository::replace(conn, record)?;
            }
            Ok(written)
        })?;
        trace!(records = records.len(), "wrote package batch");
        Ok(written)
    }

    /// Every record, ordered by name.
    pub fn scan_all(&self) -> Result<Vec<PackageRecord>> {
        let rows = self.with_conn(PackageRepository::list_all)?;
        Ok(rows.into_iter().map(PackageRecord::from).collect())
    }

    pub fn find_by_name(&self, name: &str) -> Result<Option<PackageRecord>> {
        let row = self.with_conn(|conn| PackageRepository::find_by_name(conn, name))?;
        Ok(row.map(PackageRecord::from))
    }

    pub fn count(&self) -> Result<u64> {
        let count = self.with_conn(PackageRepository::count)?;
        Ok(count.max(0) as u64)
    }
}
