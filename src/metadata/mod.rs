//! Run-name metadata parsing
//!
//! Uncle runs are named `Date-InstNum-Prod-PlateInfo`:
//!
//! ```text
//! 210602-01-Seq1 Cas9-pH003R
//! │      │  │         └─ plate info: type "pH", generation "003", side "R"
//! │      │  └─────────── product (may contain spaces)
//! │      └────────────── instrument number
//! └───────────────────── date, YYMMDD
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use uncle_db::metadata::parse_run_name;
//!
//! let (run, plate) = parse_run_name("210602-01-Seq1 Cas9-pH003R")?;
//! assert_eq!(run.instrument_number(), 1);
//! assert_eq!(run.product(), "Seq1 Cas9");
//! assert_eq!(plate.plate_type(), "pH");
//! assert_eq!(plate.generation(), "003");
//! assert_eq!(plate.side(), "R");
//! # Ok::<(), uncle_db::Error>(())
//! ```

mod plate_descriptor;
mod run_identity;

pub use plate_descriptor::PlateDescriptor;
pub use run_identity::{RunIdentity, RUN_NAME_FIELDS};

use crate::Result;

/// Parse a run name into its identity and plate descriptor.
///
/// # Errors
///
/// Returns [`Error::FormatError`](crate::Error::FormatError) when the name is
/// not four hyphen-delimited fields or the date/instrument fields do not
/// parse, and [`Error::PatternNotFound`](crate::Error::PatternNotFound) when
/// the plate info carries no generation digits.
pub fn parse_run_name(raw_name: &str) -> Result<(RunIdentity, PlateDescriptor)> {
    let identity = RunIdentity::parse(raw_name)?;
    let plate = PlateDescriptor::parse(identity.plate_info_token())?;
    tracing::debug!(
        run_name = raw_name,
        date = %identity.date(),
        instrument = identity.instrument_number(),
        plate_type = plate.plate_type(),
        generation = plate.generation(),
        side = plate.side(),
        "parsed run name"
    );
    Ok((identity, plate))
}
