//! Generic tabular record sets
//!
//! Uncle exports (summary tables, DLS correlation/intensity tables, ...) are
//! carried as named Arrow batches. The name encodes the export kind:
//! `DLS_Intensity` is export type `DLS` with DLS data type `Intensity`.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, StringArray, TimestampMicrosecondArray};
use arrow::datatypes::{
    DataType, Date32Type, Field, FieldRef, Float32Type, Float64Type, Int16Type, Int32Type,
    Int64Type, Int8Type, Schema, TimeUnit, TimestampMicrosecondType, UInt16Type, UInt32Type,
    UInt64Type, UInt8Type,
};
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Timestamps;
use crate::sentinel::normalize;
use crate::store::{Row, Value};
use crate::Result;

const UTC: &str = "UTC";

/// Export kind derived from a record set's declared name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportKind {
    export_type: String,
    dls_data_type: Option<String>,
}

impl ExportKind {
    /// Split `name` on `_`: the first segment is the export type; with
    /// exactly two segments the second is the DLS data type.
    ///
    /// ```rust
    /// use uncle_db::mapper::ExportKind;
    ///
    /// let kind = ExportKind::from_name("DLS_Intensity");
    /// assert_eq!(kind.export_type(), "DLS");
    /// assert_eq!(kind.dls_data_type(), Some("Intensity"));
    ///
    /// assert_eq!(ExportKind::from_name("Summary").dls_data_type(), None);
    /// assert_eq!(ExportKind::from_name("DLS_Correlation_Fit").dls_data_type(), None);
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let segments: Vec<&str> = name.split('_').collect();
        let dls_data_type = match segments.as_slice() {
            [_, dls] => Some((*dls).to_string()),
            _ => None,
        };
        Self {
            export_type: segments.first().copied().unwrap_or(name).to_string(),
            dls_data_type,
        }
    }

    /// Export type (first name segment).
    #[must_use]
    pub fn export_type(&self) -> &str {
        &self.export_type
    }

    /// DLS data type (second segment of a two-segment name).
    #[must_use]
    pub fn dls_data_type(&self) -> Option<&str> {
        self.dls_data_type.as_deref()
    }
}

/// A named tabular record set.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSet {
    name: String,
    batch: RecordBatch,
}

impl RecordSet {
    /// Create a record set.
    #[must_use]
    pub fn new(name: impl Into<String>, batch: RecordBatch) -> Self {
        Self {
            name: name.into(),
            batch,
        }
    }

    /// Declared name, source of the [`ExportKind`].
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Underlying batch.
    #[must_use]
    pub const fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Number of rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub(super) fn tagged(
        &self,
        kind: &ExportKind,
        timestamps: Option<Timestamps>,
        well: Option<&str>,
    ) -> Result<Self> {
        let rows = self.batch.num_rows();
        let schema = self.batch.schema();
        let mut fields: Vec<FieldRef> = schema.fields().iter().cloned().collect();
        let mut columns: Vec<ArrayRef> = self.batch.columns().to_vec();

        let mut put = |name: &str, array: ArrayRef| {
            let field = Arc::new(Field::new(name, array.data_type().clone(), false));
            match fields.iter().position(|f| f.name() == name) {
                Some(index) => {
                    fields[index] = field;
                    columns[index] = array;
                }
                None => {
                    fields.push(field);
                    columns.push(array);
                }
            }
        };

        put("export_type", text_column(kind.export_type(), rows));
        if let Some(stamps) = timestamps {
            put("created_at", timestamp_column(stamps.created_at(), rows));
            put("updated_at", timestamp_column(stamps.updated_at(), rows));
        }
        if let Some(well) = well {
            put("well", text_column(well, rows));
        }
        if let Some(dls) = kind.dls_data_type() {
            put("dls_data_type", text_column(dls, rows));
        }

        let schema = Arc::new(Schema::new_with_metadata(fields, schema.metadata().clone()));
        Ok(Self {
            name: self.name.clone(),
            batch: RecordBatch::try_new(schema, columns)?,
        })
    }
}

/// Convert a record set into store rows.
///
/// Numeric `-1` sentinels become `NULL`.
///
/// # Errors
///
/// Returns error if a value cannot be rendered.
pub fn record_set_rows(set: &RecordSet) -> Result<Vec<Row>> {
    let batch = set.batch();
    let schema = batch.schema();
    (0..batch.num_rows())
        .map(|row| -> Result<Row> {
            let mut out = Row::new();
            for (field, column) in schema.fields().iter().zip(batch.columns()) {
                out.set(field.name().as_str(), value_at(column.as_ref(), row)?);
            }
            Ok(out)
        })
        .collect()
}

fn text_column(value: &str, rows: usize) -> ArrayRef {
    Arc::new(StringArray::from(vec![value; rows]))
}

fn timestamp_column(at: DateTime<Utc>, rows: usize) -> ArrayRef {
    Arc::new(TimestampMicrosecondArray::from(vec![at.timestamp_micros(); rows]).with_timezone(UTC))
}

fn int(value: i64) -> Value {
    normalize(value).map_or(Value::Null, Value::Int)
}

fn float(value: f64) -> Value {
    normalize(value).map_or(Value::Null, Value::Float)
}

fn value_at(column: &dyn Array, row: usize) -> Result<Value> {
    if column.is_null(row) {
        return Ok(Value::Null);
    }
    let value = match column.data_type() {
        DataType::Int8 => int(column.as_primitive::<Int8Type>().value(row).into()),
        DataType::Int16 => int(column.as_primitive::<Int16Type>().value(row).into()),
        DataType::Int32 => int(column.as_primitive::<Int32Type>().value(row).into()),
        DataType::Int64 => int(column.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => int(column.as_primitive::<UInt8Type>().value(row).into()),
        DataType::UInt16 => int(column.as_primitive::<UInt16Type>().value(row).into()),
        DataType::UInt32 => int(column.as_primitive::<UInt32Type>().value(row).into()),
        DataType::UInt64 => {
            let value = column.as_primitive::<UInt64Type>().value(row);
            i64::try_from(value).map_or_else(|_| Value::Text(value.to_string()), Value::Int)
        }
        DataType::Float32 => float(column.as_primitive::<Float32Type>().value(row).into()),
        DataType::Float64 => float(column.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => Value::Int(column.as_boolean().value(row).into()),
        DataType::Utf8 => Value::Text(column.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Value::Text(column.as_string::<i64>().value(row).to_string()),
        DataType::Date32 => column
            .as_primitive::<Date32Type>()
            .value_as_date(row)
            .map_or(Value::Null, Value::Date),
        DataType::Timestamp(TimeUnit::Microsecond, _) => column
            .as_primitive::<TimestampMicrosecondType>()
            .value_as_datetime(row)
            .map_or(Value::Null, |at| Value::Timestamp(at.and_utc())),
        _ => Value::Text(array_value_to_string(column, row)?),
    };
    Ok(value)
}
