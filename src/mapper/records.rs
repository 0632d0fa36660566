//! Experiment and instrument records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Timestamps;
use crate::metadata::{PlateDescriptor, RunIdentity};
use crate::store::Row;

/// Instrument name written until an instrument registry supplies real ones
pub const PLACEHOLDER_INSTRUMENT_NAME: &str = "Uncle_01";
/// Instrument location placeholder
pub const PLACEHOLDER_INSTRUMENT_LOCATION: &str = "Shnider/Hough lab";
/// Instrument model placeholder
pub const PLACEHOLDER_INSTRUMENT_MODEL: &str = "Uncle";

/// Row of the experiments table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExperimentRecord {
    name: String,
    date: NaiveDate,
    instrument_id: Option<i64>,
    product_id: Option<i64>,
    exp_type: String,
    plate_generation: String,
    plate_side: String,
    timestamps: Option<Timestamps>,
}

impl ExperimentRecord {
    /// Assemble a record from parsed metadata and resolved references.
    #[must_use]
    pub fn new(
        identity: &RunIdentity,
        plate: &PlateDescriptor,
        instrument_id: Option<i64>,
        product_id: Option<i64>,
        timestamps: Option<Timestamps>,
    ) -> Self {
        Self {
            name: identity.raw_name().to_string(),
            date: identity.date(),
            instrument_id,
            product_id,
            exp_type: plate.plate_type().to_string(),
            plate_generation: plate.generation().to_string(),
            plate_side: plate.side().to_string(),
            timestamps,
        }
    }

    /// Run name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Experiment date.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Resolved instrument id, `None` if the instrument is not registered.
    #[must_use]
    pub const fn instrument_id(&self) -> Option<i64> {
        self.instrument_id
    }

    /// Resolved product id, `None` if the product is not registered.
    #[must_use]
    pub const fn product_id(&self) -> Option<i64> {
        self.product_id
    }

    /// Plate type.
    #[must_use]
    pub fn exp_type(&self) -> &str {
        &self.exp_type
    }

    /// Plate layout generation.
    #[must_use]
    pub fn plate_generation(&self) -> &str {
        &self.plate_generation
    }

    /// Plate side.
    #[must_use]
    pub fn plate_side(&self) -> &str {
        &self.plate_side
    }

    /// Creation/update timestamps, if stamping was enabled.
    #[must_use]
    pub const fn timestamps(&self) -> Option<Timestamps> {
        self.timestamps
    }

    /// Row for the experiments table.
    #[must_use]
    pub fn to_row(&self) -> Row {
        with_timestamps(
            Row::new()
                .with("name", self.name.as_str())
                .with("date", self.date)
                .with("instrument_id", self.instrument_id)
                .with("product_id", self.product_id)
                .with("exp_type", self.exp_type.as_str())
                .with("plate_generation", self.plate_generation.as_str())
                .with("plate_side", self.plate_side.as_str()),
            self.timestamps,
        )
    }
}

/// Row of the instruments table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstrumentRecord {
    id: i64,
    name: String,
    location: String,
    model: String,
    timestamps: Option<Timestamps>,
}

impl InstrumentRecord {
    /// Instrument `id` with the placeholder name, location and model.
    #[must_use]
    pub fn placeholder(id: i64, timestamps: Option<Timestamps>) -> Self {
        Self {
            id,
            name: PLACEHOLDER_INSTRUMENT_NAME.to_string(),
            location: PLACEHOLDER_INSTRUMENT_LOCATION.to_string(),
            model: PLACEHOLDER_INSTRUMENT_MODEL.to_string(),
            timestamps,
        }
    }

    /// Instrument number, used as the primary key.
    #[must_use]
    pub const fn id(&self) -> i64 {
        self.id
    }

    /// Instrument name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Instrument location.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Instrument model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Creation/update timestamps, if stamping was enabled.
    #[must_use]
    pub const fn timestamps(&self) -> Option<Timestamps> {
        self.timestamps
    }

    /// Row for the instruments table.
    #[must_use]
    pub fn to_row(&self) -> Row {
        with_timestamps(
            Row::new()
                .with("id", self.id)
                .with("name", self.name.as_str())
                .with("location", self.location.as_str())
                .with("model", self.model.as_str()),
            self.timestamps,
        )
    }
}

fn with_timestamps(row: Row, timestamps: Option<Timestamps>) -> Row {
    match timestamps {
        Some(stamps) => row
            .with("created_at", stamps.created_at())
            .with("updated_at", stamps.updated_at()),
        None => row,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::parse_run_name;
    use crate::store::Value;

    #[test]
    fn test_experiment_row_columns() {
        let (identity, plate) = parse_run_name("210607-01-T4 RNA Ligase-Gen006L").unwrap();
        let row = ExperimentRecord::new(&identity, &plate, Some(1), None, None).to_row();
        assert_eq!(
            row.column_names().collect::<Vec<_>>(),
            vec![
                "name",
                "date",
                "instrument_id",
                "product_id",
                "exp_type",
                "plate_generation",
                "plate_side"
            ]
        );
        assert_eq!(row.get("product_id"), Some(&Value::Null));
        assert_eq!(row.get("plate_generation"), Some(&Value::from("006")));
    }

    #[test]
    fn test_instrument_row_with_timestamps() {
        let stamps = Timestamps::now();
        let row = InstrumentRecord::placeholder(1, Some(stamps)).to_row();
        assert_eq!(row.get("name"), Some(&Value::from(PLACEHOLDER_INSTRUMENT_NAME)));
        assert_eq!(row.get("created_at"), row.get("updated_at"));
        assert_eq!(row.len(), 6);
    }
}
