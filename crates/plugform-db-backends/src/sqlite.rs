//! SQLite database backend using `rusqlite`.
//!
//! This module provides the [`SqliteBackend`] which implements the
//! [`DatabaseBackend`] trait on a single `rusqlite` connection.
//!
//! Features:
//! - WAL mode enabled for file-based databases
//! - In-memory database support via `:memory:` path (great for testing)
//! - Simple `Mutex`-based concurrency control

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use plugform_core::{PlugformError, PlugformResult};
use plugform_db::{DatabaseBackend, Row, Value};

/// A SQLite database backend.
///
/// The connection is guarded by a `Mutex`, so one backend can be shared
/// between threads; statements run one at a time.
pub struct SqliteBackend {
    /// The path to the database file (or ":memory:").
    path: PathBuf,
    conn: Mutex<rusqlite::Connection>,
}

impl SqliteBackend {
    /// Opens a new SQLite database at the given path.
    ///
    /// If the path is `:memory:`, an in-memory database is created.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open(path: impl Into<PathBuf>) -> PlugformResult<Self> {
        let path = path.into();
        let in_memory = path.to_str() == Some(":memory:");
        let conn = if in_memory {
            rusqlite::Connection::open_in_memory()
        } else {
            rusqlite::Connection::open(&path)
        }
        .map_err(|e| PlugformError::OperationalError(format!("SQLite open failed: {e}")))?;

        let pragmas = if in_memory {
            "PRAGMA foreign_keys=ON;"
        } else {
            "PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;"
        };
        conn.execute_batch(pragmas).map_err(|e| {
            PlugformError::OperationalError(format!("Failed to set pragmas: {e}"))
        })?;

        tracing::debug!(path = %path.display(), "opened sqlite database");
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Opens an in-memory database (convenience constructor).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created.
    pub fn memory() -> PlugformResult<Self> {
        Self::open(":memory:")
    }

    /// Returns the database file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> PlugformResult<MutexGuard<'_, rusqlite::Connection>> {
        self.conn.lock().map_err(|e| {
            PlugformError::OperationalError(format!("SQLite connection poisoned: {e}"))
        })
    }

    /// Binds `Value`s to a `rusqlite` statement.
    fn bind_params(stmt: &mut rusqlite::Statement<'_>, params: &[Value]) -> PlugformResult<()> {
        for (i, param) in params.iter().enumerate() {
            let idx = i + 1;
            match param {
                Value::Null => stmt.raw_bind_parameter(idx, rusqlite::types::Null),
                Value::Bool(b) => stmt.raw_bind_parameter(idx, b),
                Value::Int(v) => stmt.raw_bind_parameter(idx, v),
                Value::Float(v) => stmt.raw_bind_parameter(idx, v),
                Value::String(s) => stmt.raw_bind_parameter(idx, s.as_str()),
                Value::Date(d) => stmt.raw_bind_parameter(idx, d.to_string().as_str()),
                Value::List(_) => {
                    return Err(PlugformError::DatabaseError(format!(
                        "Cannot bind a list to parameter {idx}"
                    )))
                }
            }
            .map_err(|e| PlugformError::DatabaseError(format!("Bind error: {e}")))?;
        }
        Ok(())
    }

    /// Converts a `rusqlite::Row` to our generic `Row`.
    fn convert_row(sqlite_row: &rusqlite::Row<'_>, column_names: &[String]) -> Row {
        let values: Vec<Value> = (0..column_names.len())
            .map(|i| {
                let val_ref = sqlite_row
                    .get_ref(i)
                    .unwrap_or(rusqlite::types::ValueRef::Null);
                match val_ref {
                    rusqlite::types::ValueRef::Null => Value::Null,
                    rusqlite::types::ValueRef::Integer(v) => Value::Int(v),
                    rusqlite::types::ValueRef::Real(v) => Value::Float(v),
                    rusqlite::types::ValueRef::Text(b) | rusqlite::types::ValueRef::Blob(b) => {
                        Value::String(String::from_utf8_lossy(b).into_owned())
                    }
                }
            })
            .collect();

        Row::new(column_names.to_vec(), values)
    }
}

fn db_error(e: &rusqlite::Error) -> PlugformError {
    PlugformError::DatabaseError(e.to_string())
}

impl DatabaseBackend for SqliteBackend {
    fn vendor(&self) -> &'static str {
        "sqlite"
    }

    fn execute(&self, sql: &str, params: &[Value]) -> PlugformResult<u64> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql).map_err(|e| db_error(&e))?;
        Self::bind_params(&mut stmt, params)?;
        let count = stmt.raw_execute().map_err(|e| db_error(&e))?;
        Ok(count as u64)
    }

    fn execute_batch(&self, sql: &str) -> PlugformResult<()> {
        self.lock()?.execute_batch(sql).map_err(|e| db_error(&e))
    }

    fn query(&self, sql: &str, params: &[Value]) -> PlugformResult<Vec<Row>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql).map_err(|e| db_error(&e))?;

        let column_names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        Self::bind_params(&mut stmt, params)?;

        let mut raw_rows = stmt.raw_query();
        let mut rows = Vec::new();
        while let Some(row) = raw_rows.next().map_err(|e| db_error(&e))? {
            rows.push(Self::convert_row(row, &column_names));
        }
        Ok(rows)
    }

    fn insert(&self, sql: &str, params: &[Value]) -> PlugformResult<i64> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql).map_err(|e| db_error(&e))?;
        Self::bind_params(&mut stmt, params)?;
        stmt.raw_execute().map_err(|e| db_error(&e))?;
        Ok(conn.last_insert_rowid())
    }
}
