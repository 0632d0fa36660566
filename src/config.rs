//! Writer configuration
//!
//! Connection parameters and table names are passed explicitly to the
//! [`PersistenceWriter`](crate::writer::PersistenceWriter); there is no
//! global connection state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// PostgreSQL port used by the ebase database
pub const DEFAULT_PORT: u16 = 5432;

/// Connection parameters for the relational store.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database user (e.g. `postgres`)
    pub user: String,
    /// Password, often empty
    pub password: String,
    /// Host address (e.g. `ebase-db-c`)
    pub host: String,
    /// Database name (e.g. `ebase_dev`)
    pub database: String,
    /// Port, fixed at [`DEFAULT_PORT`] unless overridden
    pub port: u16,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            user: "postgres".to_string(),
            password: String::new(),
            host: "localhost".to_string(),
            database: "ebase_dev".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl DatabaseConfig {
    /// Create a config on the default port.
    #[must_use]
    pub fn new(
        user: impl Into<String>,
        password: impl Into<String>,
        host: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
            host: host.into(),
            database: database.into(),
            port: DEFAULT_PORT,
        }
    }

    /// Override the port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("database", &self.database)
            .field("port", &self.port)
            .finish()
    }
}

/// Target and reference table names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableNames {
    /// Experiment rows are appended here
    pub experiments: String,
    /// Instrument rows are appended here; `instrument_id` resolves against it
    pub instruments: String,
    /// `product_id` resolves against this table by `name`
    pub products: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            experiments: "experiments".to_string(),
            instruments: "instruments".to_string(),
            products: "products".to_string(),
        }
    }
}

/// Configuration for a [`PersistenceWriter`](crate::writer::PersistenceWriter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Connection parameters
    pub database: DatabaseConfig,
    /// Table names
    pub tables: TableNames,
    /// Inject `created_at`/`updated_at` columns (required by Rails tables)
    pub timestamps: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            tables: TableNames::default(),
            timestamps: true,
        }
    }
}

impl WriterConfig {
    /// Create a config for `database` with timestamps enabled.
    #[must_use]
    pub fn new(database: DatabaseConfig) -> Self {
        Self {
            database,
            ..Self::default()
        }
    }

    /// Enable or disable timestamp injection.
    #[must_use]
    pub const fn timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }

    /// Use custom table names (e.g. `uncle_experiments`).
    #[must_use]
    pub fn tables(mut self, tables: TableNames) -> Self {
        self.tables = tables;
        self
    }
}
