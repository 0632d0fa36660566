//! In-memory container tree.
//!
//! Stands in for an opened `.uni` file in tests and fixtures.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::{display_path, Container, RawRow, RUN_GROUP, RUN_NAME_ATTRIBUTE, SAMPLE_DATASET};
use crate::{Error, Result};

/// In-memory hierarchical container.
///
/// Groups and datasets are keyed by their `/`-joined path.
#[derive(Debug, Default)]
pub struct MemoryContainer {
    attributes: HashMap<String, HashMap<String, Vec<u8>>>,
    datasets: HashMap<String, Vec<RawRow>>,
    closed: bool,
    close_calls: Arc<AtomicUsize>,
}

impl MemoryContainer {
    /// Create an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the layout of an Uncle run: the run name attribute plus a
    /// `SampleData` dataset of `(well, sample)` rows.
    #[must_use]
    pub fn uncle_run(run_name: &str, samples: &[(&str, &str)]) -> Self {
        let rows = samples
            .iter()
            .map(|(well, sample)| vec![well.as_bytes().to_vec(), sample.as_bytes().to_vec()])
            .collect();
        Self::new()
            .with_attribute(RUN_GROUP, RUN_NAME_ATTRIBUTE, run_name)
            .with_dataset(SAMPLE_DATASET, rows)
    }

    /// Set an attribute on a group.
    #[must_use]
    pub fn with_attribute(
        mut self,
        group: &[&str],
        name: impl Into<String>,
        value: impl Into<Vec<u8>>,
    ) -> Self {
        self.attributes
            .entry(group.join("/"))
            .or_default()
            .insert(name.into(), value.into());
        self
    }

    /// Set the rows of a dataset.
    #[must_use]
    pub fn with_dataset(mut self, dataset: &[&str], rows: Vec<RawRow>) -> Self {
        self.datasets.insert(dataset.join("/"), rows);
        self
    }

    /// Shared counter of `close` calls, readable after the container has
    /// been moved into a [`UniFile`](super::UniFile).
    #[must_use]
    pub fn close_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.close_calls)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::ContainerError("container is closed".to_string()));
        }
        Ok(())
    }
}

impl Container for MemoryContainer {
    fn attribute(&self, group: &[&str], name: &str) -> Result<Vec<u8>> {
        self.ensure_open()?;
        let attrs = self
            .attributes
            .get(&group.join("/"))
            .ok_or_else(|| Error::ContainerError(format!("no group {}", display_path(group))))?;
        attrs.get(name).cloned().ok_or_else(|| {
            Error::ContainerError(format!(
                "no attribute {name:?} on {}",
                display_path(group)
            ))
        })
    }

    fn rows(&self, dataset: &[&str]) -> Result<Vec<RawRow>> {
        self.ensure_open()?;
        self.datasets
            .get(&dataset.join("/"))
            .cloned()
            .ok_or_else(|| Error::ContainerError(format!("no dataset {}", display_path(dataset))))
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
