//! Hierarchical data access for Uncle `.uni` files
//!
//! A `.uni` file is an HDF5 tree. Only two things in it matter here:
//!
//! ```text
//! Application1/
//! └── Run1/                 attrs: "Run Name" = b"210602-01-Seq1 Cas9-pH003R"
//!     └── SampleData        rows: (b"A1", b"0.1 mg/ml Uni A1"), (b"B1", ...), ...
//! ```
//!
//! The storage format stays behind the [`Container`] trait. [`UniFile`] owns
//! a container and exposes the run name, wells and samples on top of it.
//!
//! ## Backends
//!
//! - [`MemoryContainer`]: in-memory tree (tests, fixtures)
//! - [`ArrowContainer`]: `SampleData` as Arrow record batches with the run
//!   attributes in the schema metadata, loadable from Parquet

mod columnar;
mod memory;
mod uni_file;

pub use columnar::ArrowContainer;
pub use memory::MemoryContainer;
pub use uni_file::{UniFile, WellRecord};

use crate::Result;

/// Group holding the run attributes and the sample dataset
pub const RUN_GROUP: &[&str] = &["Application1", "Run1"];

/// Attribute on [`RUN_GROUP`] carrying the run name
pub const RUN_NAME_ATTRIBUTE: &str = "Run Name";

/// Per-sample dataset: column 0 is the well label, column 1 the sample
pub const SAMPLE_DATASET: &[&str] = &["Application1", "Run1", "SampleData"];

/// One dataset row as raw field bytes, in column order.
pub type RawRow = Vec<Vec<u8>>;

/// Read-only view over a hierarchical container.
///
/// Paths are given as group names from the root, e.g.
/// `["Application1", "Run1"]`.
pub trait Container {
    /// Read attribute `name` of the group at `group`.
    ///
    /// # Errors
    ///
    /// Returns error if the group or attribute does not exist.
    fn attribute(&self, group: &[&str], name: &str) -> Result<Vec<u8>>;

    /// Read every row of the dataset at `dataset`, in storage order.
    ///
    /// # Errors
    ///
    /// Returns error if the dataset does not exist or cannot be read.
    fn rows(&self, dataset: &[&str]) -> Result<Vec<RawRow>>;

    /// Release the underlying handle. Called exactly once by [`UniFile`].
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails to release its resources.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Render a path the way HDF5 tools print it.
#[must_use]
pub fn display_path(path: &[&str]) -> String {
    format!("/{}", path.join("/"))
}
