//! In-memory relational store using `DashMap`.
//!
//! Data is lost when the last handle is dropped. Used by tests and the demo
//! in place of the PostgreSQL tables.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use super::{describe_key, Connection, Connector, Row, Value};
use crate::config::DatabaseConfig;
use crate::error::LookupMiss;
use crate::Result;

#[derive(Debug, Default)]
struct Inner {
    tables: DashMap<String, Vec<Row>>,
    fail_lookups: AtomicBool,
    connections: AtomicUsize,
}

/// In-memory database: named tables of rows.
///
/// Cloning is cheap and every clone sees the same tables, so a test can keep
/// one handle for inspection while the writer owns another.
///
/// # Example
///
/// ```rust
/// use uncle_db::store::{MemoryDatabase, Row};
///
/// let db = MemoryDatabase::new();
/// db.seed("products", Row::new().with("id", 7_i64).with("name", "Seq1 Cas9"));
/// assert_eq!(db.row_count("products"), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    inner: Arc<Inner>,
}

impl MemoryDatabase {
    /// Create an empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a reference row directly, bypassing any connection.
    pub fn seed(&self, table: &str, row: Row) {
        self.inner
            .tables
            .entry(table.to_string())
            .or_default()
            .push(row);
    }

    /// Snapshot of every row in `table` (empty if the table does not exist).
    #[must_use]
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.inner
            .tables
            .get(table)
            .map(|rows| rows.value().clone())
            .unwrap_or_default()
    }

    /// Number of rows in `table`.
    #[must_use]
    pub fn row_count(&self, table: &str) -> usize {
        self.inner.tables.get(table).map_or(0, |rows| rows.len())
    }

    /// Make every lookup fail as if the query errored.
    pub fn fail_lookups(&self, fail: bool) {
        self.inner.fail_lookups.store(fail, Ordering::SeqCst);
    }

    /// Number of connections opened so far.
    #[must_use]
    pub fn connections_opened(&self) -> usize {
        self.inner.connections.load(Ordering::SeqCst)
    }
}

impl Connector for MemoryDatabase {
    type Connection = MemoryConnection;

    fn connect(&self, config: &DatabaseConfig) -> Result<MemoryConnection> {
        self.inner.connections.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(database = %config.database, "opened in-memory connection");
        Ok(MemoryConnection {
            db: self.clone(),
        })
    }
}

/// Connection to a [`MemoryDatabase`].
#[derive(Debug)]
pub struct MemoryConnection {
    db: MemoryDatabase,
}

impl Connection for MemoryConnection {
    fn lookup_id(
        &mut self,
        table: &str,
        column: &str,
        key: &Value,
    ) -> std::result::Result<i64, LookupMiss> {
        let key_desc = describe_key(column, key);
        if self.db.inner.fail_lookups.load(Ordering::SeqCst) {
            return Err(LookupMiss::QueryFailed {
                table: table.to_string(),
                key: key_desc,
                reason: "lookups disabled".to_string(),
            });
        }

        let no_match = || LookupMiss::NoMatch {
            table: table.to_string(),
            key: key_desc.clone(),
        };
        let rows = self.db.inner.tables.get(table).ok_or_else(no_match)?;
        let row = rows
            .iter()
            .find(|row| row.get(column) == Some(key))
            .ok_or_else(no_match)?;

        row.get("id").and_then(Value::as_int).ok_or_else(|| LookupMiss::QueryFailed {
            table: table.to_string(),
            key: key_desc.clone(),
            reason: "matching row has no integer id".to_string(),
        })
    }

    fn append(&mut self, table: &str, rows: &[Row]) -> Result<usize> {
        self.db
            .inner
            .tables
            .entry(table.to_string())
            .or_default()
            .extend_from_slice(rows);
        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection(db: &MemoryDatabase) -> MemoryConnection {
        db.connect(&DatabaseConfig::default()).unwrap()
    }

    #[test]
    fn test_lookup_hit() {
        let db = MemoryDatabase::new();
        db.seed("instruments", Row::new().with("id", 1_i64).with("name", "Uncle_01"));
        let id = connection(&db)
            .lookup_id("instruments", "id", &Value::Int(1))
            .unwrap();
        assert_eq!(id, 1);
    }

    #[test]
    fn test_lookup_missing_table() {
        let db = MemoryDatabase::new();
        let miss = connection(&db)
            .lookup_id("products", "name", &Value::from("Seq1 Cas9"))
            .unwrap_err();
        assert_eq!(
            miss,
            LookupMiss::NoMatch {
                table: "products".to_string(),
                key: "name = 'Seq1 Cas9'".to_string(),
            }
        );
    }

    #[test]
    fn test_lookup_failure_switch() {
        let db = MemoryDatabase::new();
        db.seed("products", Row::new().with("id", 3_i64).with("name", "T4"));
        db.fail_lookups(true);
        let miss = connection(&db)
            .lookup_id("products", "name", &Value::from("T4"))
            .unwrap_err();
        assert!(matches!(miss, LookupMiss::QueryFailed { .. }));
    }

    #[test]
    fn test_append_and_count_connections() {
        let db = MemoryDatabase::new();
        let mut conn = connection(&db);
        assert_eq!(conn.append("t", &[Row::new().with("a", 1_i64)]).unwrap(), 1);
        assert_eq!(conn.append("t", &[Row::new().with("a", 1_i64)]).unwrap(), 1);
        assert_eq!(db.row_count("t"), 2);
        assert_eq!(db.connections_opened(), 1);
    }
}
