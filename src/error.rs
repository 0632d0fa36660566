//! Error types for uncle-db
//!
//! Every surfaced error names the offending input so a failed ingest can be
//! traced back to the `.uni` file that caused it.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// uncle-db error types
#[derive(Error, Debug)]
pub enum Error {
    /// Run name does not follow `Date-InstNum-Prod-PlateInfo`
    #[error("Run name format error: {reason}\nRun name: {input:?}\nExpected Date-InstNum-Prod-PlateInfo (e.g. 210602-01-Seq1 Cas9-pH003R)")]
    FormatError {
        /// The string that failed to parse
        input: String,
        /// What was wrong with it
        reason: String,
    },

    /// A required plate-info pattern matched nothing
    #[error("Pattern not found: no {pattern} in plate info {input:?}")]
    PatternNotFound {
        /// Human-readable name of the pattern
        pattern: &'static str,
        /// The plate-info token that was scanned
        input: String,
    },

    /// No sample row carries the requested well label
    #[error("Well not found: {0:?} is not a well label in this run")]
    WellNotFound(String),

    /// Container read error (missing group, attribute or dataset, bad field)
    #[error("Container error: {0}")]
    ContainerError(String),

    /// Relational store error (connect or append)
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Arrow/Parquet error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

/// Failed foreign-key resolution.
///
/// Not part of [`Error`]: a miss is recovered by the mapper, which writes a
/// null reference instead of aborting the ingest.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupMiss {
    /// The reference table has no row with this key
    #[error("no row in {table} where {key}")]
    NoMatch {
        /// Reference table that was queried
        table: String,
        /// `column = value` description of the key
        key: String,
    },

    /// The lookup query itself failed
    #[error("lookup in {table} where {key} failed: {reason}")]
    QueryFailed {
        /// Reference table that was queried
        table: String,
        /// `column = value` description of the key
        key: String,
        /// Store-reported failure
        reason: String,
    },
}

impl LookupMiss {
    /// Reference table the miss came from.
    #[must_use]
    pub fn table(&self) -> &str {
        match self {
            Self::NoMatch { table, .. } | Self::QueryFailed { table, .. } => table,
        }
    }
}
