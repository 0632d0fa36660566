//! Persistence writer
//!
//! **Append-only**: rows are inserted without checking for an existing row
//! with the same natural key. Writing the same `.uni` file twice produces
//! two experiment rows.
//!
//! Each `write_*` call opens its own connection from the configured
//! [`DatabaseConfig`](crate::config::DatabaseConfig), resolves foreign keys
//! on it, appends, and drops it.

use crate::config::WriterConfig;
use crate::container::{Container, UniFile};
use crate::mapper::{record_set_rows, ExperimentRecord, InstrumentRecord, RecordSet, RelationalMapper};
use crate::metadata::{PlateDescriptor, RunIdentity};
use crate::store::{Connection, Connector, Value};
use crate::Result;

/// Writes mapped records to the relational store.
///
/// # Example
///
/// ```rust
/// use uncle_db::config::WriterConfig;
/// use uncle_db::container::{MemoryContainer, UniFile};
/// use uncle_db::store::{MemoryDatabase, Row};
/// use uncle_db::writer::PersistenceWriter;
///
/// let db = MemoryDatabase::new();
/// db.seed("products", Row::new().with("id", 7_i64).with("name", "Seq1 Cas9"));
///
/// let file = UniFile::new(MemoryContainer::uncle_run("210602-01-Seq1 Cas9-pH003R", &[]));
/// let writer = PersistenceWriter::new(db.clone(), WriterConfig::default());
/// let record = writer.write_experiment(&file)?;
///
/// assert_eq!(record.product_id(), Some(7));
/// assert_eq!(record.instrument_id(), None);
/// assert_eq!(db.row_count("experiments"), 1);
/// # Ok::<(), uncle_db::Error>(())
/// ```
pub struct PersistenceWriter<S: Connector> {
    connector: S,
    config: WriterConfig,
    mapper: RelationalMapper,
}

impl<S: Connector> PersistenceWriter<S> {
    /// Create a writer over `connector`.
    #[must_use]
    pub fn new(connector: S, config: WriterConfig) -> Self {
        let mapper = RelationalMapper::new(config.timestamps);
        Self {
            connector,
            config,
            mapper,
        }
    }

    /// Writer configuration.
    #[must_use]
    pub const fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Append the experiment row for the run in `file`.
    ///
    /// # Errors
    ///
    /// Returns error if the run name cannot be read or parsed, or the store
    /// rejects the insert. Unresolved references are written as `NULL`.
    pub fn write_experiment<C: Container>(&self, file: &UniFile<C>) -> Result<ExperimentRecord> {
        let (identity, plate) = file.run_metadata()?;
        self.write_run(&identity, &plate)
    }

    /// Append the experiment row for already-parsed run metadata.
    ///
    /// # Errors
    ///
    /// Returns error if the connection cannot be opened or the store rejects
    /// the insert.
    pub fn write_run(
        &self,
        identity: &RunIdentity,
        plate: &PlateDescriptor,
    ) -> Result<ExperimentRecord> {
        let tables = &self.config.tables;
        let mut conn = self.connector.connect(&self.config.database)?;

        let instrument_id = conn.lookup_id(
            &tables.instruments,
            "id",
            &Value::Int(identity.instrument_number()),
        );
        let product_id = conn.lookup_id(
            &tables.products,
            "name",
            &Value::from(identity.product()),
        );

        let record = self
            .mapper
            .map_experiment(identity, plate, instrument_id, product_id);
        conn.append(&tables.experiments, &[record.to_row()])?;

        tracing::info!(
            table = %tables.experiments,
            run_name = record.name(),
            instrument_id = ?record.instrument_id(),
            product_id = ?record.product_id(),
            "wrote experiment"
        );
        Ok(record)
    }

    /// Append the instrument row for the run in `file`.
    ///
    /// # Errors
    ///
    /// Returns error if the run name cannot be read or parsed, or the store
    /// rejects the insert.
    pub fn write_instrument<C: Container>(&self, file: &UniFile<C>) -> Result<InstrumentRecord> {
        let (identity, _) = file.run_metadata()?;
        let record = self.mapper.map_instrument(identity.instrument_number());

        let mut conn = self.connector.connect(&self.config.database)?;
        conn.append(&self.config.tables.instruments, &[record.to_row()])?;

        tracing::info!(
            table = %self.config.tables.instruments,
            id = record.id(),
            "wrote instrument"
        );
        Ok(record)
    }

    /// Tag a tabular export and append its rows to `table`.
    ///
    /// Returns the number of rows written.
    ///
    /// # Errors
    ///
    /// Returns error if the export cannot be converted or the store rejects
    /// the insert.
    pub fn write_record_set(
        &self,
        table: &str,
        set: &RecordSet,
        well: Option<&str>,
    ) -> Result<usize> {
        let tagged = self.mapper.map_record_set(set, well)?;
        let rows = record_set_rows(&tagged)?;

        let mut conn = self.connector.connect(&self.config.database)?;
        let written = conn.append(table, &rows)?;

        tracing::info!(table, record_set = set.name(), rows = written, "wrote record set");
        Ok(written)
    }
}
