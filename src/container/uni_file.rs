//! `UniFile` - scoped accessor over an Uncle run container

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    display_path, ArrowContainer, Container, RawRow, RUN_GROUP, RUN_NAME_ATTRIBUTE,
    SAMPLE_DATASET,
};
use crate::metadata::{parse_run_name, PlateDescriptor, RunIdentity};
use crate::{Error, Result};

const WELL_COLUMN: usize = 0;
const SAMPLE_COLUMN: usize = 1;

/// One sample row: well label and sample description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WellRecord {
    position: usize,
    well_label: String,
    sample_description: String,
}

impl WellRecord {
    /// 1-based position of the row in the sample dataset.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Well label, e.g. `A1`.
    #[must_use]
    pub fn well_label(&self) -> &str {
        &self.well_label
    }

    /// Sample description, e.g. `0.1 mg/ml Uni A1`.
    #[must_use]
    pub fn sample_description(&self) -> &str {
        &self.sample_description
    }

    /// Positional well identifier, e.g. `Well_01`.
    #[must_use]
    pub fn well_number(&self) -> String {
        well_number_for(self.position)
    }
}

/// Accessor over an opened Uncle run.
///
/// Owns the container for its whole lifetime and releases it exactly once:
/// through [`UniFile::close`], or on drop if the caller bailed out early.
///
/// Every query re-reads the container; snapshot [`UniFile::wells`] once when
/// stable indices are needed.
///
/// # Example
///
/// ```rust
/// use uncle_db::container::{MemoryContainer, UniFile};
///
/// let container = MemoryContainer::uncle_run(
///     "210602-01-Seq1 Cas9-pH003R",
///     &[("A1", "0.1 mg/ml Uni A1"), ("B1", "0.1 mg/ml Uni B1")],
/// );
/// let file = UniFile::new(container);
///
/// assert_eq!(file.wells()?, vec!["A1", "B1"]);
/// assert_eq!(file.well_number("B1")?, "Well_02");
/// file.close()?;
/// # Ok::<(), uncle_db::Error>(())
/// ```
pub struct UniFile<C: Container> {
    container: C,
    closed: bool,
}

impl<C: Container> UniFile<C> {
    /// Take ownership of an opened container.
    #[must_use]
    pub const fn new(container: C) -> Self {
        Self {
            container,
            closed: false,
        }
    }

    /// Name of the run, from the `Run Name` attribute.
    ///
    /// # Errors
    ///
    /// Returns error if the attribute is missing or not UTF-8.
    pub fn run_name(&self) -> Result<String> {
        let bytes = self.container.attribute(RUN_GROUP, RUN_NAME_ATTRIBUTE)?;
        decode(bytes, &format!("{}@{RUN_NAME_ATTRIBUTE}", display_path(RUN_GROUP)))
    }

    /// Parse the run name into identity and plate descriptor.
    ///
    /// # Errors
    ///
    /// Returns error if the run name cannot be read or does not follow the
    /// naming convention.
    pub fn run_metadata(&self) -> Result<(RunIdentity, PlateDescriptor)> {
        parse_run_name(&self.run_name()?)
    }

    /// Experiment date.
    ///
    /// # Errors
    ///
    /// See [`UniFile::run_metadata`].
    pub fn exp_date(&self) -> Result<NaiveDate> {
        Ok(self.run_identity()?.date())
    }

    /// Number of the instrument used.
    ///
    /// # Errors
    ///
    /// See [`UniFile::run_metadata`].
    pub fn exp_instrument_number(&self) -> Result<i64> {
        Ok(self.run_identity()?.instrument_number())
    }

    /// Product tested.
    ///
    /// # Errors
    ///
    /// See [`UniFile::run_metadata`].
    pub fn exp_product(&self) -> Result<String> {
        Ok(self.run_identity()?.product().to_string())
    }

    /// Plate/screen type (`pH`, `cond`, `Gen`).
    ///
    /// # Errors
    ///
    /// See [`UniFile::run_metadata`].
    pub fn exp_plate_type(&self) -> Result<String> {
        Ok(self.run_metadata()?.1.plate_type().to_string())
    }

    /// Generation of the plate layout.
    ///
    /// # Errors
    ///
    /// See [`UniFile::run_metadata`].
    pub fn exp_generation(&self) -> Result<String> {
        Ok(self.run_metadata()?.1.generation().to_string())
    }

    /// Plate side (`L`/`R`).
    ///
    /// # Errors
    ///
    /// See [`UniFile::run_metadata`].
    pub fn exp_plate_side(&self) -> Result<String> {
        Ok(self.run_metadata()?.1.side().to_string())
    }

    /// Well labels in dataset order, e.g. `["A1", "B1", ...]`.
    ///
    /// # Errors
    ///
    /// Returns error if the sample dataset cannot be read.
    pub fn wells(&self) -> Result<Vec<String>> {
        self.column(WELL_COLUMN)
    }

    /// Sample descriptions in dataset order.
    ///
    /// # Errors
    ///
    /// Returns error if the sample dataset cannot be read.
    pub fn samples(&self) -> Result<Vec<String>> {
        self.column(SAMPLE_COLUMN)
    }

    /// Wells and samples zipped into records, numbered from 1.
    ///
    /// # Errors
    ///
    /// Returns error if the sample dataset cannot be read.
    pub fn well_records(&self) -> Result<Vec<WellRecord>> {
        self.sample_rows()?
            .into_iter()
            .enumerate()
            .map(|(index, row)| -> Result<WellRecord> {
                Ok(WellRecord {
                    position: index + 1,
                    well_label: field(&row, WELL_COLUMN, index)?,
                    sample_description: field(&row, SAMPLE_COLUMN, index)?,
                })
            })
            .collect()
    }

    /// Positional identifier of the first row labelled `label`
    /// (`"A1"` → `"Well_01"`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::WellNotFound`] if no row carries the label.
    pub fn well_number(&self, label: &str) -> Result<String> {
        self.wells()?
            .iter()
            .position(|well| well == label)
            .map(|index| well_number_for(index + 1))
            .ok_or_else(|| Error::WellNotFound(label.to_string()))
    }

    /// Release the container.
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails to release its handle.
    pub fn close(mut self) -> Result<()> {
        self.release()
    }

    fn release(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.container.close()
    }

    fn run_identity(&self) -> Result<RunIdentity> {
        RunIdentity::parse(&self.run_name()?)
    }

    fn sample_rows(&self) -> Result<Vec<RawRow>> {
        self.container.rows(SAMPLE_DATASET)
    }

    fn column(&self, column: usize) -> Result<Vec<String>> {
        self.sample_rows()?
            .iter()
            .enumerate()
            .map(|(index, row)| field(row, column, index))
            .collect()
    }
}

impl UniFile<ArrowContainer> {
    /// Open a run exported to Parquet.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn open_parquet<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(ArrowContainer::open_parquet(path)?))
    }
}

impl<C: Container> Drop for UniFile<C> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            tracing::warn!(error = %e, "failed to release container");
        }
    }
}

fn well_number_for(position: usize) -> String {
    format!("Well_{position:02}")
}

fn field(row: &RawRow, column: usize, index: usize) -> Result<String> {
    let location = format!("{}[{index}][{column}]", display_path(SAMPLE_DATASET));
    let bytes = row.get(column).ok_or_else(|| {
        Error::ContainerError(format!("{location}: row has only {} fields", row.len()))
    })?;
    decode(bytes.clone(), &location)
}

// Fixed-length HDF5 strings are NUL padded.
fn decode(mut bytes: Vec<u8>, location: &str) -> Result<String> {
    while bytes.last() == Some(&0) {
        bytes.pop();
    }
    String::from_utf8(bytes)
        .map_err(|e| Error::ContainerError(format!("{location}: not valid UTF-8: {e}")))
}
