//! Relational store interface
//!
//! The database engine is an external collaborator. The writer only needs
//! two things from it: resolve a surrogate id by natural key, and append
//! rows to a named table.
//!
//! ```text
//! Connector ──connect(DatabaseConfig)──> Connection
//!                                          ├── lookup_id(table, column, key) -> Result<i64, LookupMiss>
//!                                          └── append(table, rows)           -> Result<usize>
//! ```
//!
//! Connections are opened per write and dropped when it finishes; nothing is
//! pooled.

mod memory;
#[cfg(feature = "postgres")]
mod postgres_store;

pub use memory::{MemoryConnection, MemoryDatabase};
#[cfg(feature = "postgres")]
pub use postgres_store::{PostgresConnection, PostgresConnector};

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::DatabaseConfig;
use crate::error::LookupMiss;
use crate::Result;

/// A single column value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// SQL `NULL`
    Null,
    /// Integer column
    Int(i64),
    /// Floating-point column
    Float(f64),
    /// Text column
    Text(String),
    /// Calendar date
    Date(NaiveDate),
    /// Timestamp (`created_at`/`updated_at`)
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// True for SQL `NULL`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Integer payload, if any.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "'{}'", value.replace('\'', "''")),
            Self::Date(value) => write!(f, "'{value}'"),
            Self::Timestamp(value) => write!(f, "'{}'", value.to_rfc3339()),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// One table row: column names and values in insert order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    /// Create an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column, replacing an existing one of the same name in place.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    /// Set a column, replacing an existing one of the same name in place.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.columns.iter_mut().find(|(name, _)| *name == column) {
            Some(slot) => slot.1 = value,
            None => self.columns.push((column, value)),
        }
    }

    /// Value of `column`, if present.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Column names in insert order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// `(column, value)` pairs in insert order.
    #[must_use]
    pub fn columns(&self) -> &[(String, Value)] {
        &self.columns
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True when the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// An open connection to the relational store.
pub trait Connection {
    /// Resolve `id` of the first row in `table` whose `column` equals `key`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupMiss::NoMatch`] when no row matches and
    /// [`LookupMiss::QueryFailed`] when the query errors.
    fn lookup_id(&mut self, table: &str, column: &str, key: &Value)
        -> std::result::Result<i64, LookupMiss>;

    /// Append rows to `table`. Existing rows are never checked or updated.
    ///
    /// Returns the number of rows written.
    ///
    /// # Errors
    ///
    /// Returns error if the store rejects the insert.
    fn append(&mut self, table: &str, rows: &[Row]) -> Result<usize>;
}

/// Opens short-lived connections from explicit configuration.
pub trait Connector {
    /// Connection type produced by this connector.
    type Connection: Connection;

    /// Open a connection.
    ///
    /// # Errors
    ///
    /// Returns error if the store cannot be reached.
    fn connect(&self, config: &DatabaseConfig) -> Result<Self::Connection>;
}

/// `column = value` rendering used in lookup diagnostics.
#[must_use]
pub fn describe_key(column: &str, key: &Value) -> String {
    format!("{column} = {key}")
}
