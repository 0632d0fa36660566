//! Run Identity - typed fields of the run name

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Number of hyphen-delimited fields in a run name.
pub const RUN_NAME_FIELDS: usize = 4;

const DATE_FORMAT: &str = "%y%m%d";
const DATE_DIGITS: usize = 6;

/// Run Identity holds the fields encoded in a run name.
///
/// Built once from the container's `Run Name` attribute and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunIdentity {
    raw_name: String,
    date: NaiveDate,
    instrument_number: i64,
    product: String,
    plate_info_token: String,
}

impl RunIdentity {
    /// Parse `Date-InstNum-Prod-PlateInfo`.
    ///
    /// The date is year-first `YYMMDD`; the instrument number may be
    /// zero-padded (`01`); the product is kept verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FormatError`] when the name does not split into
    /// exactly four fields or the date/instrument field fails to parse.
    pub fn parse(raw_name: &str) -> Result<Self> {
        let fields: Vec<&str> = raw_name.split('-').collect();
        let [date, inst, product, plate_info] = fields.as_slice() else {
            return Err(format_error(
                raw_name,
                format!(
                    "expected {RUN_NAME_FIELDS} hyphen-delimited fields, found {}",
                    fields.len()
                ),
            ));
        };

        // chrono accepts single-digit %m/%d, so the width is checked first
        if date.len() != DATE_DIGITS || !date.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format_error(
                raw_name,
                format!("date field {date:?} is not YYMMDD: expected {DATE_DIGITS} digits"),
            ));
        }
        let date = NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|e| {
            format_error(raw_name, format!("date field {date:?} is not YYMMDD: {e}"))
        })?;

        let instrument_number = inst.trim().parse::<i64>().map_err(|e| {
            format_error(
                raw_name,
                format!("instrument field {inst:?} is not an integer: {e}"),
            )
        })?;

        Ok(Self {
            raw_name: raw_name.to_string(),
            date,
            instrument_number,
            product: (*product).to_string(),
            plate_info_token: (*plate_info).to_string(),
        })
    }

    /// The run name exactly as stored in the file.
    #[must_use]
    pub fn raw_name(&self) -> &str {
        &self.raw_name
    }

    /// Experiment date.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Number of the instrument the run was recorded on.
    #[must_use]
    pub const fn instrument_number(&self) -> i64 {
        self.instrument_number
    }

    /// Product under test.
    #[must_use]
    pub fn product(&self) -> &str {
        &self.product
    }

    /// Final field of the run name, source of the plate descriptor.
    #[must_use]
    pub fn plate_info_token(&self) -> &str {
        &self.plate_info_token
    }

    /// Reassemble the run name in canonical form (`YYMMDD`, two-digit
    /// instrument number).
    #[must_use]
    pub fn to_run_name(&self) -> String {
        format!(
            "{}-{:02}-{}-{}",
            self.date.format(DATE_FORMAT),
            self.instrument_number,
            self.product,
            self.plate_info_token
        )
    }
}

fn format_error(input: &str, reason: String) -> Error {
    Error::FormatError {
        input: input.to_string(),
        reason,
    }
}
