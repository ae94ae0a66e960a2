#![allow(dead_code)]

pub mod dicom_files;

use angio_volume::{AssemblyError, DEFAULT_ORDERING_TAG, Slice, SliceSource};
use ndarray::Array2;
use std::path::{Path, PathBuf};

/// Serves pre-built slices in a fixed enumeration order. `None` entries fail
/// to decode.
pub struct MemorySource {
    entries: Vec<(PathBuf, Option<Slice>)>,
}

impl MemorySource {
    pub fn new(entries: Vec<(&str, Option<Slice>)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, slice)| (PathBuf::from(name), slice))
                .collect(),
        }
    }
}

impl SliceSource for MemorySource {
    fn list_series(&self, directory: &Path) -> Result<Vec<PathBuf>, AssemblyError> {
        Ok(self
            .entries
            .iter()
            .map(|(name, _)| directory.join(name))
            .collect())
    }

    fn decode(&self, file: &Path) -> Result<Slice, AssemblyError> {
        self.entries
            .iter()
            .find(|(name, _)| file.ends_with(name))
            .and_then(|(_, slice)| slice.clone())
            .ok_or_else(|| AssemblyError::Decode {
                path: file.to_path_buf(),
                reason: "corrupt".into(),
            })
    }
}

/// A `rows` x `columns` slice filled with `fill`, keyed by `time`.
pub fn slice(rows: usize, columns: usize, fill: u16, time: &str) -> Slice {
    Slice::new(
        Array2::from_shape_fn((rows, columns), |(y, x)| fill + (y * columns + x) as u16),
        [10.0, 20.0, fill as f64],
        [0.75, 0.75],
    )
    .with_metadata(DEFAULT_ORDERING_TAG, time)
}
