//! Relational mapping
//!
//! Turns parsed run metadata, lookup results and tabular exports into rows
//! for the target tables.
//!
//! ## Schema Overview
//!
//! ```text
//! instruments (1) ──< experiments (N) >── (1) products
//!   id                  name, date
//!   name                instrument_id   (nullable)
//!   location            product_id      (nullable)
//!   model               exp_type, plate_generation, plate_side
//!   [created_at]        [created_at]
//!   [updated_at]        [updated_at]
//! ```
//!
//! Foreign-key misses are not fatal: a [`LookupMiss`] becomes a null
//! reference and the experiment row is still produced.

mod record_set;
mod records;

pub use record_set::{record_set_rows, ExportKind, RecordSet};
pub use records::{
    ExperimentRecord, InstrumentRecord, PLACEHOLDER_INSTRUMENT_LOCATION,
    PLACEHOLDER_INSTRUMENT_MODEL, PLACEHOLDER_INSTRUMENT_NAME,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LookupMiss;
use crate::metadata::{PlateDescriptor, RunIdentity};
use crate::Result;

/// `created_at`/`updated_at` pair, equal at creation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Timestamps {
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Timestamps {
    /// Both timestamps set to `at`.
    #[must_use]
    pub const fn at(at: DateTime<Utc>) -> Self {
        Self {
            created_at: at,
            updated_at: at,
        }
    }

    /// Both timestamps set to the current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    /// Creation time.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last update time.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Builds table-ready records.
#[derive(Debug, Clone, Copy)]
pub struct RelationalMapper {
    timestamps: bool,
}

impl RelationalMapper {
    /// Create a mapper; `timestamps` toggles `created_at`/`updated_at`.
    #[must_use]
    pub const fn new(timestamps: bool) -> Self {
        Self { timestamps }
    }

    /// Whether records get timestamps.
    #[must_use]
    pub const fn timestamps_enabled(&self) -> bool {
        self.timestamps
    }

    /// Timestamps for a record mapped now, if enabled.
    #[must_use]
    pub fn stamp(&self) -> Option<Timestamps> {
        self.timestamps.then(Timestamps::now)
    }

    /// Map run metadata and lookup results to an experiments row.
    ///
    /// A [`LookupMiss`] on either reference becomes `None`.
    #[must_use]
    pub fn map_experiment(
        &self,
        identity: &RunIdentity,
        plate: &PlateDescriptor,
        instrument_id: std::result::Result<i64, LookupMiss>,
        product_id: std::result::Result<i64, LookupMiss>,
    ) -> ExperimentRecord {
        ExperimentRecord::new(
            identity,
            plate,
            resolved(instrument_id),
            resolved(product_id),
            self.stamp(),
        )
    }

    /// Map an instrument number to an instruments row with placeholder
    /// descriptive fields.
    #[must_use]
    pub fn map_instrument(&self, instrument_number: i64) -> InstrumentRecord {
        InstrumentRecord::placeholder(instrument_number, self.stamp())
    }

    /// Tag a tabular export with its export kind, optional well and
    /// timestamps.
    ///
    /// Adds `export_type`, then `created_at`/`updated_at` (if enabled), then
    /// `well` (if given), then `dls_data_type` (if the name has exactly two
    /// `_`-separated segments). Existing columns of the same name are
    /// replaced.
    ///
    /// # Errors
    ///
    /// Returns error if the tagged batch cannot be assembled.
    pub fn map_record_set(&self, set: &RecordSet, well: Option<&str>) -> Result<RecordSet> {
        set.tagged(&ExportKind::from_name(set.name()), self.stamp(), well)
    }
}

impl Default for RelationalMapper {
    fn default() -> Self {
        Self::new(true)
    }
}

fn resolved(lookup: std::result::Result<i64, LookupMiss>) -> Option<i64> {
    match lookup {
        Ok(id) => Some(id),
        Err(miss) => {
            tracing::warn!(table = miss.table(), %miss, "unresolved reference, writing NULL");
            None
        }
    }
}
