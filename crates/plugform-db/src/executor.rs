//! The database executor trait.
//!
//! [`DatabaseBackend`] is the bridge between the storage-aware code in
//! `plugform-models` and the concrete drivers in `plugform-db-backends`.
//! Model code accepts `&dyn DatabaseBackend`, which backends implement.
//! The engine is synchronous, so every method blocks until the statement
//! completes.

use plugform_core::{PlugformError, PlugformResult};

use crate::row::Row;
use crate::value::Value;

/// Minimal database executor trait.
pub trait DatabaseBackend: Send + Sync {
    /// Returns the vendor name (e.g. "sqlite").
    fn vendor(&self) -> &'static str;

    /// Runs a SQL statement that does not return rows.
    /// Returns the number of rows affected.
    fn execute(&self, sql: &str, params: &[Value]) -> PlugformResult<u64>;

    /// Runs several `;`-separated statements without parameters.
    fn execute_batch(&self, sql: &str) -> PlugformResult<()>;

    /// Runs a SQL query and returns all result rows.
    fn query(&self, sql: &str, params: &[Value]) -> PlugformResult<Vec<Row>>;

    /// Runs an `INSERT` and returns the id of the inserted row.
    fn insert(&self, sql: &str, params: &[Value]) -> PlugformResult<i64>;

    /// Runs a SQL query and returns exactly one row.
    ///
    /// Returns `DoesNotExist` if no rows, `MultipleObjectsReturned` if more
    /// than one.
    fn query_one(&self, sql: &str, params: &[Value]) -> PlugformResult<Row> {
        let mut rows = self.query(sql, params)?;
        match rows.len() {
            0 => Err(PlugformError::DoesNotExist(
                "Query returned no rows".to_string(),
            )),
            1 => Ok(rows.remove(0)),
            n => Err(PlugformError::MultipleObjectsReturned(format!(
                "Query returned {n} rows"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Returns canned rows and records executed statements.
    struct CannedBackend {
        rows: Vec<Row>,
        log: Mutex<Vec<String>>,
    }

    impl DatabaseBackend for CannedBackend {
        fn vendor(&self) -> &'static str {
            "canned"
        }

        fn execute(&self, sql: &str, _params: &[Value]) -> PlugformResult<u64> {
            self.log.lock().unwrap().push(sql.to_string());
            Ok(1)
        }

        fn execute_batch(&self, sql: &str) -> PlugformResult<()> {
            self.log.lock().unwrap().push(sql.to_string());
            Ok(())
        }

        fn query(&self, _sql: &str, _params: &[Value]) -> PlugformResult<Vec<Row>> {
            Ok(self.rows.clone())
        }

        fn insert(&self, sql: &str, params: &[Value]) -> PlugformResult<i64> {
            self.execute(sql, params)?;
            Ok(1)
        }
    }

    fn backend(n: usize) -> CannedBackend {
        let rows = (0..n)
            .map(|i| Row::new(vec!["id".into()], vec![Value::from(i64::try_from(i).unwrap())]))
            .collect();
        CannedBackend {
            rows,
            log: Mutex::new(Vec::new()),
        }
    }

    #[test]
    fn test_query_one_exactly_one() {
        let row = backend(1).query_one("SELECT", &[]).unwrap();
        assert_eq!(row.get::<i64>("id").unwrap(), 0);
    }

    #[test]
    fn test_query_one_none() {
        let err = backend(0).query_one("SELECT", &[]).unwrap_err();
        assert!(matches!(err, PlugformError::DoesNotExist(_)));
    }

    #[test]
    fn test_query_one_many() {
        let err = backend(2).query_one("SELECT", &[]).unwrap_err();
        assert!(matches!(err, PlugformError::MultipleObjectsReturned(_)));
    }

    #[test]
    fn test_insert_goes_through_execute() {
        let b = backend(0);
        b.insert("INSERT", &[]).unwrap();
        assert_eq!(b.log.lock().unwrap().as_slice(), &["INSERT".to_string()]);
    }
}
