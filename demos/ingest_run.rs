//! Uncle Run Ingest Example
//!
//! Parses a run, prints its metadata and wells, and writes instrument,
//! experiment and DLS rows to an in-memory store.
//!
//! Run with: cargo run --example ingest_run [-- path/to/run.parquet]
//! Logging:  RUST_LOG=uncle_db=debug cargo run --example ingest_run

use std::sync::Arc;

use anyhow::Context;
use arrow::array::{Float64Array, RecordBatch};
use arrow::datatypes::{DataType, Field, Schema};
use tracing_subscriber::EnvFilter;
use uncle_db::config::{DatabaseConfig, WriterConfig};
use uncle_db::container::{Container, MemoryContainer, UniFile};
use uncle_db::mapper::RecordSet;
use uncle_db::store::{MemoryDatabase, Row};
use uncle_db::writer::PersistenceWriter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== uncle-db Run Ingest ===\n");

    match std::env::args().nth(1) {
        Some(path) => {
            let file = UniFile::open_parquet(&path).with_context(|| format!("opening {path}"))?;
            ingest(file)
        }
        None => ingest(UniFile::new(MemoryContainer::uncle_run(
            "210602-01-Seq1 Cas9-pH003R",
            &[
                ("A1", "0.1 mg/ml Uni A1"),
                ("B1", "0.1 mg/ml Uni B1"),
                ("C1", "0.1 mg/ml Uni C1"),
                ("D1", "buffer blank"),
            ],
        ))),
    }
}

fn ingest<C: Container>(file: UniFile<C>) -> anyhow::Result<()> {
    // -------------------------------------------------------------------------
    // 1. Run metadata
    // -------------------------------------------------------------------------
    println!("1. Parsing run name...");

    let (run, plate) = file.run_metadata().context("parsing run name")?;
    println!("   Run:        {}", run.raw_name());
    println!("   Date:       {}", run.date());
    println!("   Instrument: {}", run.instrument_number());
    println!("   Product:    {}", run.product());
    println!(
        "   Plate:      type={} generation={} side={}",
        plate.plate_type(),
        plate.generation(),
        plate.side()
    );

    // -------------------------------------------------------------------------
    // 2. Wells
    // -------------------------------------------------------------------------
    println!("\n2. Wells...");

    let wells = file.well_records()?;
    for well in &wells {
        println!(
            "   {} {:<4} {}",
            well.well_number(),
            well.well_label(),
            well.sample_description()
        );
    }

    // -------------------------------------------------------------------------
    // 3. Write to the store
    // -------------------------------------------------------------------------
    println!("\n3. Writing rows...");

    let db = MemoryDatabase::new();
    db.seed("products", Row::new().with("id", 1_i64).with("name", run.product()));

    let config = WriterConfig::new(DatabaseConfig::new("postgres", "", "localhost", "ebase_dev"));
    let writer = PersistenceWriter::new(db.clone(), config);

    let instrument = writer.write_instrument(&file)?;
    let experiment = writer.write_experiment(&file)?;
    println!("   Instrument id: {}", instrument.id());
    println!(
        "   Experiment: instrument_id={:?} product_id={:?}",
        experiment.instrument_id(),
        experiment.product_id()
    );

    if let Some(first) = wells.first() {
        let well = first.well_number();
        let written = writer.write_record_set("dls_data", &dls_export()?, Some(well.as_str()))?;
        println!("   DLS rows for {well}: {written}");
    }

    // -------------------------------------------------------------------------
    // 4. Store contents
    // -------------------------------------------------------------------------
    println!("\n4. Store contents:");
    for table in ["instruments", "experiments", "dls_data"] {
        println!("   {table}: {} rows", db.row_count(table));
    }
    println!(
        "\n   experiments[0] JSON:\n{}",
        serde_json::to_string_pretty(&experiment)?
    );

    file.close()?;
    println!("\n=== Ingest Complete ===");
    Ok(())
}

fn dls_export() -> anyhow::Result<RecordSet> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Radius (nm)", DataType::Float64, false),
        Field::new("Intensity", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Float64Array::from(vec![0.8, 1.6, 3.2, 6.4])),
            Arc::new(Float64Array::from(vec![0.02, 0.41, -1.0, 0.07])),
        ],
    )?;
    Ok(RecordSet::new("DLS_Intensity", batch))
}
