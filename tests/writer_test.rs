//! Persistence writer tests against the in-memory store

use std::sync::Arc;

use arrow::array::{Float64Array, RecordBatch};
use arrow::datatypes::{DataType, Field, Schema};
use chrono::NaiveDate;
use uncle_db::config::{TableNames, WriterConfig};
use uncle_db::container::{MemoryContainer, UniFile};
use uncle_db::mapper::{RecordSet, PLACEHOLDER_INSTRUMENT_NAME};
use uncle_db::store::{MemoryDatabase, Row, Value};
use uncle_db::writer::PersistenceWriter;
use uncle_db::Error;

const RUN_NAME: &str = "210602-01-Seq1 Cas9-pH003R";

fn run_file() -> UniFile<MemoryContainer> {
    UniFile::new(MemoryContainer::uncle_run(
        RUN_NAME,
        &[("A1", "0.1 mg/ml Uni A1"), ("B1", "0.1 mg/ml Uni B1")],
    ))
}

fn seeded_db() -> MemoryDatabase {
    let db = MemoryDatabase::new();
    db.seed("instruments", Row::new().with("id", 1_i64).with("name", "Uncle_01"));
    db.seed("products", Row::new().with("id", 42_i64).with("name", "Seq1 Cas9"));
    db
}

// =============================================================================
// Experiments
// =============================================================================

#[test]
fn test_write_experiment_resolves_references() {
    let db = seeded_db();
    let writer = PersistenceWriter::new(db.clone(), WriterConfig::default());

    let record = writer.write_experiment(&run_file()).unwrap();

    assert_eq!(record.instrument_id(), Some(1));
    assert_eq!(record.product_id(), Some(42));

    let rows = db.rows("experiments");
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.get("name"), Some(&Value::from(RUN_NAME)));
    assert_eq!(
        row.get("date"),
        Some(&Value::Date(NaiveDate::from_ymd_opt(2021, 6, 2).unwrap()))
    );
    assert_eq!(row.get("instrument_id"), Some(&Value::Int(1)));
    assert_eq!(row.get("product_id"), Some(&Value::Int(42)));
    assert_eq!(row.get("exp_type"), Some(&Value::from("pH")));
    assert_eq!(row.get("plate_generation"), Some(&Value::from("003")));
    assert_eq!(row.get("plate_side"), Some(&Value::from("R")));
    assert_eq!(row.get("created_at"), row.get("updated_at"));
    assert!(row.get("created_at").is_some());
}

#[test]
fn test_unknown_product_writes_null() {
    let db = MemoryDatabase::new();
    db.seed("instruments", Row::new().with("id", 1_i64));
    let writer = PersistenceWriter::new(db.clone(), WriterConfig::default());

    let record = writer.write_experiment(&run_file()).unwrap();

    assert_eq!(record.product_id(), None);
    assert_eq!(record.instrument_id(), Some(1));
    assert_eq!(record.name(), RUN_NAME);
    assert_eq!(record.exp_type(), "pH");
    assert_eq!(record.plate_generation(), "003");
    assert_eq!(record.plate_side(), "R");
    assert_eq!(db.rows("experiments")[0].get("product_id"), Some(&Value::Null));
}

#[test]
fn test_failing_lookup_writes_null() {
    let db = seeded_db();
    db.fail_lookups(true);
    let writer = PersistenceWriter::new(db.clone(), WriterConfig::default());

    let record = writer.write_experiment(&run_file()).unwrap();

    assert_eq!(record.instrument_id(), None);
    assert_eq!(record.product_id(), None);
    assert_eq!(db.row_count("experiments"), 1);
}

#[test]
fn test_rewriting_same_file_duplicates_rows() {
    // Append-only: no natural-key deduplication is performed.
    let db = seeded_db();
    let writer = PersistenceWriter::new(db.clone(), WriterConfig::default());
    let file = run_file();

    writer.write_experiment(&file).unwrap();
    writer.write_experiment(&file).unwrap();

    let rows = db.rows("experiments");
    assert_eq!(rows.len(), 2);
    for column in ["name", "date", "instrument_id", "product_id", "exp_type"] {
        assert_eq!(rows[0].get(column), rows[1].get(column), "column {column}");
    }
}

#[test]
fn test_connection_per_write() {
    let db = seeded_db();
    let writer = PersistenceWriter::new(db.clone(), WriterConfig::default());
    let file = run_file();

    writer.write_instrument(&file).unwrap();
    writer.write_experiment(&file).unwrap();

    assert_eq!(db.connections_opened(), 2);
}

#[test]
fn test_timestamps_disabled() {
    let db = seeded_db();
    let writer = PersistenceWriter::new(db.clone(), WriterConfig::default().timestamps(false));

    let record = writer.write_experiment(&run_file()).unwrap();

    assert!(record.timestamps().is_none());
    let row = &db.rows("experiments")[0];
    assert!(row.get("created_at").is_none());
    assert_eq!(row.len(), 7);
}

#[test]
fn test_bad_run_name_writes_nothing() {
    let db = seeded_db();
    let writer = PersistenceWriter::new(db.clone(), WriterConfig::default());
    let file = UniFile::new(MemoryContainer::uncle_run("210602-01-pH003R", &[]));

    assert!(matches!(
        writer.write_experiment(&file),
        Err(Error::FormatError { .. })
    ));
    assert_eq!(db.row_count("experiments"), 0);
    assert_eq!(db.connections_opened(), 0);
}

#[test]
fn test_custom_table_names() {
    let db = MemoryDatabase::new();
    db.seed("uncle_instruments", Row::new().with("id", 1_i64));
    let tables = TableNames {
        experiments: "uncle_experiments".to_string(),
        instruments: "uncle_instruments".to_string(),
        products: "products".to_string(),
    };
    let writer = PersistenceWriter::new(db.clone(), WriterConfig::default().tables(tables));

    let record = writer.write_experiment(&run_file()).unwrap();

    assert_eq!(record.instrument_id(), Some(1));
    assert_eq!(db.row_count("uncle_experiments"), 1);
    assert_eq!(db.row_count("experiments"), 0);
}

// =============================================================================
// Instruments
// =============================================================================

#[test]
fn test_write_instrument_placeholder() {
    let db = MemoryDatabase::new();
    let writer = PersistenceWriter::new(db.clone(), WriterConfig::default());

    let record = writer.write_instrument(&run_file()).unwrap();

    assert_eq!(record.id(), 1);
    assert_eq!(record.name(), PLACEHOLDER_INSTRUMENT_NAME);
    assert_eq!(record.location(), "Shnider/Hough lab");
    assert_eq!(record.model(), "Uncle");

    let row = &db.rows("instruments")[0];
    assert_eq!(
        row.column_names().collect::<Vec<_>>(),
        vec!["id", "name", "location", "model", "created_at", "updated_at"]
    );
}

#[test]
fn test_instrument_then_experiment_links() {
    let db = MemoryDatabase::new();
    let writer = PersistenceWriter::new(db.clone(), WriterConfig::default());
    let file = run_file();

    writer.write_instrument(&file).unwrap();
    let record = writer.write_experiment(&file).unwrap();

    assert_eq!(record.instrument_id(), Some(1));
}

// =============================================================================
// Record sets
// =============================================================================

fn dls_export() -> RecordSet {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Radius (nm)", DataType::Float64, false),
        Field::new("Intensity", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Float64Array::from(vec![0.5, 1.0, 2.0])),
            Arc::new(Float64Array::from(vec![0.1, -1.0, 0.3])),
        ],
    )
    .unwrap();
    RecordSet::new("DLS_Intensity", batch)
}

#[test]
fn test_write_record_set_tags_rows() {
    let db = MemoryDatabase::new();
    let writer = PersistenceWriter::new(db.clone(), WriterConfig::default());
    let file = run_file();
    let well = file.well_number("A1").unwrap();

    let written = writer
        .write_record_set("dls_data", &dls_export(), Some(well.as_str()))
        .unwrap();

    assert_eq!(written, 3);
    let rows = db.rows("dls_data");
    assert_eq!(
        rows[0].column_names().collect::<Vec<_>>(),
        vec![
            "Radius (nm)",
            "Intensity",
            "export_type",
            "created_at",
            "updated_at",
            "well",
            "dls_data_type"
        ]
    );
    assert_eq!(rows[0].get("export_type"), Some(&Value::from("DLS")));
    assert_eq!(rows[0].get("dls_data_type"), Some(&Value::from("Intensity")));
    assert_eq!(rows[2].get("well"), Some(&Value::from("Well_01")));
    assert_eq!(rows[1].get("Intensity"), Some(&Value::Null));
    assert!(matches!(rows[0].get("created_at"), Some(Value::Timestamp(_))));
    assert_eq!(rows[0].get("created_at"), rows[0].get("updated_at"));
}

#[test]
fn test_write_record_set_without_well_or_timestamps() {
    let db = MemoryDatabase::new();
    let writer = PersistenceWriter::new(db.clone(), WriterConfig::default().timestamps(false));
    let set = RecordSet::new("Summary", dls_export().batch().clone());

    writer.write_record_set("summary", &set, None).unwrap();

    let row = &db.rows("summary")[0];
    assert_eq!(row.get("export_type"), Some(&Value::from("Summary")));
    assert!(row.get("well").is_none());
    assert!(row.get("dls_data_type").is_none());
    assert!(row.get("created_at").is_none());
}
