//! # plugform-db-backends
//!
//! Database backend implementations for plugform. Each backend implements
//! [`DatabaseBackend`](plugform_db::DatabaseBackend).
//!
//! Supported backends:
//! - `SQLite` (feature `sqlite`, enabled by default)

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteBackend;
