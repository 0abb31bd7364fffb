//! SQLite-backed local package store.
//!
//! One table, `packages`, keyed by package name. Records are written in one
//! transaction per repository batch and read back ordered by name.

pub mod connection;
pub mod error;
pub mod migration;
pub mod models;
pub mod repository;
pub mod schema;
pub mod store;

pub use error::{DbError, Result};
pub use store::{PackageStore, STORE_FILE_NAME};
