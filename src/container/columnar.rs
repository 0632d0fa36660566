//! Arrow-backed container
//!
//! A `.uni` run exported to Arrow: the `SampleData` dataset is the record
//! batches, and group attributes live in the schema metadata under
//! `<group path>/<attribute>` keys (`Application1/Run1/Run Name`).

use std::path::Path;

use arrow::array::{Array, BinaryArray, LargeBinaryArray};
use arrow::datatypes::{DataType, SchemaRef};
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;

use super::{display_path, Container, RawRow, SAMPLE_DATASET};
use crate::{Error, Result};

/// Container over Arrow record batches.
pub struct ArrowContainer {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
    dataset: String,
}

impl ArrowContainer {
    /// Wrap batches holding the `SampleData` dataset.
    ///
    /// Attributes are read from `schema`'s metadata.
    #[must_use]
    pub fn new(schema: SchemaRef, batches: Vec<RecordBatch>) -> Self {
        Self {
            schema,
            batches,
            dataset: SAMPLE_DATASET.join("/"),
        }
    }

    /// Load a run exported to Parquet.
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn open_parquet<P: AsRef<Path>>(path: P) -> Result<Self> {
        use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
        use std::fs::File;

        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            Error::ContainerError(format!("Failed to open {}: {e}", path.display()))
        })?;

        let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| {
            Error::ContainerError(format!("Failed to parse {}: {e}", path.display()))
        })?;
        let schema = builder.schema().clone();

        let reader = builder.build().map_err(|e| {
            Error::ContainerError(format!("Failed to create Parquet reader: {e}"))
        })?;

        let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
        tracing::debug!(
            path = %path.display(),
            batches = batches.len(),
            "opened parquet container"
        );

        Ok(Self::new(schema, batches))
    }

    /// Schema of the sample dataset, including attribute metadata.
    #[must_use]
    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }
}

impl Container for ArrowContainer {
    fn attribute(&self, group: &[&str], name: &str) -> Result<Vec<u8>> {
        let key = format!("{}/{name}", group.join("/"));
        self.schema
            .metadata()
            .get(&key)
            .map(|value| value.as_bytes().to_vec())
            .ok_or_else(|| {
                Error::ContainerError(format!(
                    "no attribute {name:?} on {}",
                    display_path(group)
                ))
            })
    }

    fn rows(&self, dataset: &[&str]) -> Result<Vec<RawRow>> {
        if dataset.join("/") != self.dataset {
            return Err(Error::ContainerError(format!(
                "no dataset {}",
                display_path(dataset)
            )));
        }

        let mut rows = Vec::new();
        for batch in &self.batches {
            let schema = batch.schema();
            for row in 0..batch.num_rows() {
                let index = rows.len();
                rows.push(
                    schema
                        .fields()
                        .iter()
                        .zip(batch.columns())
                        .map(|(field, column)| {
                            if column.is_null(row) {
                                return Err(Error::ContainerError(format!(
                                    "{}[{index}]: null in column {:?}",
                                    display_path(dataset),
                                    field.name()
                                )));
                            }
                            field_bytes(column.as_ref(), row)
                        })
                        .collect::<Result<RawRow>>()?,
                );
            }
        }
        Ok(rows)
    }
}

fn field_bytes(column: &dyn Array, row: usize) -> Result<Vec<u8>> {
    let bytes = match column.data_type() {
        DataType::Binary => column
            .as_any()
            .downcast_ref::<BinaryArray>()
            .map(|array| array.value(row).to_vec()),
        DataType::LargeBinary => column
            .as_any()
            .downcast_ref::<LargeBinaryArray>()
            .map(|array| array.value(row).to_vec()),
        _ => Some(array_value_to_string(column, row)?.into_bytes()),
    };
    bytes.ok_or_else(|| {
        Error::ContainerError(format!(
            "column type {} does not match its array",
            column.data_type()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{RUN_GROUP, RUN_NAME_ATTRIBUTE};
    use arrow::array::{Int32Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use std::collections::HashMap;
    use std::sync::Arc;

    fn container() -> ArrowContainer {
        container_with_samples(vec![Some(&b"lysozyme"[..]), None])
    }

    fn container_with_samples(samples: Vec<Option<&[u8]>>) -> ArrowContainer {
        let metadata = HashMap::from([(
            "Application1/Run1/Run Name".to_string(),
            "210602-01-Seq1 Cas9-pH003R".to_string(),
        )]);
        let schema = Arc::new(Schema::new_with_metadata(
            vec![
                Field::new("well", DataType::Utf8, false),
                Field::new("sample", DataType::Binary, true),
                Field::new("replicate", DataType::Int32, false),
            ],
            metadata,
        ));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["A1", "B1"])),
                Arc::new(BinaryArray::from(samples)),
                Arc::new(Int32Array::from(vec![1, 2])),
            ],
        )
        .unwrap();
        ArrowContainer::new(schema, vec![batch])
    }

    #[test]
    fn test_attribute_from_metadata() {
        let value = container().attribute(RUN_GROUP, RUN_NAME_ATTRIBUTE).unwrap();
        assert_eq!(value, b"210602-01-Seq1 Cas9-pH003R");
    }

    #[test]
    fn test_rows_mixed_types() {
        let rows = container_with_samples(vec![Some(&b"lysozyme"[..]), Some(&b"buffer"[..])])
            .rows(SAMPLE_DATASET)
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec![b"A1".to_vec(), b"lysozyme".to_vec(), b"1".to_vec()]);
        assert_eq!(rows[1][1], b"buffer".to_vec());
    }

    #[test]
    fn test_null_cell_is_an_error() {
        let err = container().rows(SAMPLE_DATASET).unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, Error::ContainerError(_)));
        assert!(message.contains("/Application1/Run1/SampleData[1]"));
        assert!(message.contains("\"sample\""));
    }

    #[test]
    fn test_unknown_dataset() {
        assert!(container().rows(&["Application1", "Run1", "DLS"]).is_err());
    }
}
