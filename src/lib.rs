//! # uncle-db: Uncle Run Metadata Ingest
//!
//! uncle-db reads Uncle protein-stability `.uni` files, reconstructs the
//! experiment metadata encoded in the run name, and appends it to the
//! relational tables behind the lab's Rails app.
//!
//! ## Pipeline
//!
//! ```text
//! UniFile ──run_name()──> metadata::parse_run_name ──> RelationalMapper ──> PersistenceWriter
//!   │                      (RunIdentity,                 (ExperimentRecord,     (FK lookup +
//!   └──wells()/samples()    PlateDescriptor)              InstrumentRecord)      append)
//! ```
//!
//! Raw numeric instrument values pass through [`sentinel::normalize`] on the
//! way to a row, so the instrument's `-1` becomes `NULL`.
//!
//! ## Example Usage
//!
//! ```rust
//! use uncle_db::config::WriterConfig;
//! use uncle_db::container::{MemoryContainer, UniFile};
//! use uncle_db::store::MemoryDatabase;
//! use uncle_db::writer::PersistenceWriter;
//!
//! let file = UniFile::new(MemoryContainer::uncle_run(
//!     "210602-01-Seq1 Cas9-pH003R",
//!     &[("A1", "0.1 mg/ml Uni A1"), ("B1", "0.1 mg/ml Uni B1")],
//! ));
//!
//! let (run, plate) = file.run_metadata()?;
//! assert_eq!(run.product(), "Seq1 Cas9");
//! assert_eq!(plate.generation(), "003");
//! assert_eq!(file.well_number("B1")?, "Well_02");
//!
//! let writer = PersistenceWriter::new(MemoryDatabase::new(), WriterConfig::default());
//! writer.write_instrument(&file)?;
//! writer.write_experiment(&file)?;
//! file.close()?;
//! # Ok::<(), uncle_db::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod config;
pub mod container;
pub mod error;
pub mod mapper;
pub mod metadata;
pub mod sentinel;
pub mod store;
pub mod writer;

pub use error::{Error, LookupMiss, Result};
