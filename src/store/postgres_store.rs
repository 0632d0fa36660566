//! PostgreSQL-backed store (feature `postgres`).
//!
//! One client per connection, opened per write. Every bound parameter is
//! cast explicitly (`$1::BIGINT`, `$2::TEXT`, ...) so values bind against
//! `int4`/`varchar` columns through assignment casts.

use postgres::types::ToSql;
use postgres::{Client, NoTls};

use super::{describe_key, Connection, Connector, Row, Value};
use crate::config::DatabaseConfig;
use crate::error::LookupMiss;
use crate::{Error, Result};

/// Connector opening `postgres::Client`s from a [`DatabaseConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresConnector;

impl Connector for PostgresConnector {
    type Connection = PostgresConnection;

    fn connect(&self, config: &DatabaseConfig) -> Result<PostgresConnection> {
        let client = postgres::Config::new()
            .user(&config.user)
            .password(&config.password)
            .host(&config.host)
            .port(config.port)
            .dbname(&config.database)
            .connect(NoTls)
            .map_err(|e| Error::StorageError(format!("Failed to connect to {config:?}: {e}")))?;
        Ok(PostgresConnection { client })
    }
}

/// Open PostgreSQL connection.
pub struct PostgresConnection {
    client: Client,
}

impl Connection for PostgresConnection {
    fn lookup_id(
        &mut self,
        table: &str,
        column: &str,
        key: &Value,
    ) -> std::result::Result<i64, LookupMiss> {
        let key_desc = describe_key(column, key);
        let (placeholder, param) = match bind(key, 1) {
            Bound::Param(placeholder, param) => (placeholder, param),
            Bound::Null => {
                return Err(LookupMiss::NoMatch {
                    table: table.to_string(),
                    key: key_desc,
                })
            }
        };
        let sql = format!(
            "SELECT id::BIGINT FROM {} WHERE {} = {placeholder} LIMIT 1",
            quote_ident(table),
            quote_ident(column)
        );

        let row = self
            .client
            .query_opt(&sql, &[param.as_ref()])
            .map_err(|e| LookupMiss::QueryFailed {
                table: table.to_string(),
                key: key_desc.clone(),
                reason: e.to_string(),
            })?
            .ok_or_else(|| LookupMiss::NoMatch {
                table: table.to_string(),
                key: key_desc.clone(),
            })?;

        row.try_get::<_, i64>(0).map_err(|e| LookupMiss::QueryFailed {
            table: table.to_string(),
            key: key_desc,
            reason: e.to_string(),
        })
    }

    fn append(&mut self, table: &str, rows: &[Row]) -> Result<usize> {
        for row in rows {
            let mut placeholders = Vec::with_capacity(row.len());
            let mut params: Vec<Box<dyn ToSql + Sync>> = Vec::with_capacity(row.len());
            for (_, value) in row.columns() {
                match bind(value, params.len() + 1) {
                    Bound::Param(placeholder, param) => {
                        placeholders.push(placeholder);
                        params.push(param);
                    }
                    Bound::Null => placeholders.push("NULL".to_string()),
                }
            }
            let columns: Vec<String> = row.column_names().map(quote_ident).collect();
            let sql = format!(
                "INSERT INTO {} ({}) VALUES ({})",
                quote_ident(table),
                columns.join(", "),
                placeholders.join(", ")
            );
            let refs: Vec<&(dyn ToSql + Sync)> = params.iter().map(AsRef::as_ref).collect();
            self.client
                .execute(&sql, &refs)
                .map_err(|e| Error::StorageError(format!("INSERT INTO {table} failed: {e}")))?;
        }
        Ok(rows.len())
    }
}

enum Bound {
    Param(String, Box<dyn ToSql + Sync>),
    Null,
}

fn bind(value: &Value, index: usize) -> Bound {
    let (cast, param): (&str, Box<dyn ToSql + Sync>) = match value {
        Value::Null => return Bound::Null,
        Value::Int(v) => ("BIGINT", Box::new(*v)),
        Value::Float(v) => ("FLOAT8", Box::new(*v)),
        Value::Text(v) => ("TEXT", Box::new(v.clone())),
        Value::Date(v) => ("DATE", Box::new(*v)),
        // Rails timestamp columns are `timestamp without time zone` in UTC
        Value::Timestamp(v) => ("TIMESTAMP", Box::new(v.naive_utc())),
    };
    Bound::Param(format!("${index}::{cast}"), param)
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("experiments"), "\"experiments\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_bind_casts() {
        assert!(matches!(bind(&Value::Null, 1), Bound::Null));
        match bind(&Value::Int(4), 3) {
            Bound::Param(placeholder, _) => assert_eq!(placeholder, "$3::BIGINT"),
            Bound::Null => panic!("expected parameter"),
        }
    }
}
