//! Ordered volume assembly.
//!
//! The assembler pulls the files of one series from a [`SliceSource`], decodes
//! each one and extracts its ordering key, sorts the series by key, checks
//! that every slice shares the in-plane geometry of the first sorted slice and
//! stacks the slices into a [`Volume`]. Any failure aborts the whole run.

use crate::{
    enums::Execution,
    error::AssemblyError,
    ordering_key::OrderingKeyExtractor,
    slice::{KeyedSlice, SliceGeometry},
    slice_source::SliceSource,
    volume::Volume,
    volume_sink::VolumeSink,
};

use dicom::core::dictionary::DataDictionary;
use dicom_dictionary_std::StandardDataDictionary;
use ndarray::{Array3, s};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Along-axis spacing of assembled volumes.
pub const STACK_SPACING: f64 = 1.0;

/// Keyed slices of one series.
#[derive(Debug, Default)]
pub struct Series {
    slices: Vec<KeyedSlice>,
}

impl Series {
    pub fn new(slices: Vec<KeyedSlice>) -> Self {
        Self { slices }
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    pub fn slices(&self) -> &[KeyedSlice] {
        &self.slices
    }

    /// Sort by ascending key. The sort is stable so equal keys keep their
    /// enumeration order.
    pub fn sort(&mut self) {
        self.slices.sort_by(|a, b| a.key.total_cmp(&b.key));
    }

    /// Check every slice against the geometry of the first one.
    ///
    /// # Errors
    ///
    /// `GeometryMismatch` naming the first slice whose size or spacing differs.
    pub fn validate_geometry(&self) -> Result<Option<SliceGeometry>, AssemblyError> {
        let Some(first) = self.slices.first() else {
            return Ok(None);
        };
        let reference = first.slice.geometry();

        for keyed in &self.slices[1..] {
            let geometry = keyed.slice.geometry();
            if geometry != reference {
                return Err(AssemblyError::GeometryMismatch {
                    path: keyed.path.clone(),
                    expected: reference.to_string(),
                    found: geometry.to_string(),
                });
            }
        }
        Ok(Some(reference))
    }

    /// Stack the slices, in their current order, into a volume.
    ///
    /// Each slice is released once its plane has been copied.
    ///
    /// # Errors
    ///
    /// `GeometryMismatch` if the slices are inconsistent.
    pub fn into_volume(self, directory: &Path) -> Result<Volume, AssemblyError> {
        let reference = self
            .validate_geometry()?
            .ok_or_else(|| AssemblyError::NotFound {
                directory: directory.to_path_buf(),
                reason: "series has no slices".into(),
            })?;
        let origin = self.slices[0].slice.origin;

        let (width, height) = reference.size;
        let depth = self.slices.len();
        let mut data = Array3::<u16>::zeros((depth, height, width));

        for (i, keyed) in self.slices.into_iter().enumerate() {
            data.slice_mut(s![i, .., ..]).assign(&keyed.slice.pixels);
        }

        Ok(Volume::new(
            data,
            origin,
            [reference.spacing[0], reference.spacing[1], STACK_SPACING],
        ))
    }
}

/// Builds a volume from one series of slices.
pub struct SeriesAssembler<S> {
    source: S,
    extractor: OrderingKeyExtractor,
    execution: Execution,
}

impl<S: SliceSource + Sync> SeriesAssembler<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            extractor: OrderingKeyExtractor::default(),
            execution: Execution::default(),
        }
    }

    pub fn with_extractor(mut self, extractor: OrderingKeyExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_execution(mut self, execution: Execution) -> Self {
        self.execution = execution;
        self
    }

    /// Decode every file of the series in `directory` and key it.
    ///
    /// # Errors
    ///
    /// `NotFound` when the series has no files, otherwise the first decode or
    /// key extraction error in enumeration order.
    pub fn collect(&self, directory: &Path) -> Result<Series, AssemblyError> {
        let files = self.source.list_series(directory)?;
        if files.is_empty() {
            return Err(AssemblyError::NotFound {
                directory: directory.to_path_buf(),
                reason: "series has no files".into(),
            });
        }
        info!("Reading {} slices from {}", files.len(), directory.display());

        let slices = match self.execution {
            Execution::Sequential => files
                .into_iter()
                .enumerate()
                .map(|(index, path)| self.key_slice(index, path))
                .collect::<Result<Vec<_>, _>>()?,
            Execution::Parallel => {
                // keep every result so the reported error is the first in
                // enumeration order, not the first to finish
                let results: Vec<_> = files
                    .into_par_iter()
                    .enumerate()
                    .map(|(index, path)| self.key_slice(index, path))
                    .collect();
                results.into_iter().collect::<Result<Vec<_>, _>>()?
            }
        };

        Ok(Series::new(slices))
    }

    /// Assemble the series in `directory` into a volume.
    pub fn assemble(&self, directory: &Path) -> Result<Volume, AssemblyError> {
        let mut series = self.collect(directory)?;
        series.sort();
        let volume = series.into_volume(directory)?;

        let [width, height, depth] = volume.size();
        debug!("Created a {}x{}x{} volume", width, height, depth);
        Ok(volume)
    }

    /// Assemble the series in `directory` and encode it to `output`.
    ///
    /// Nothing is written unless assembly succeeds.
    pub fn assemble_into(
        &self,
        directory: &Path,
        sink: &impl VolumeSink,
        output: &Path,
    ) -> Result<Volume, AssemblyError> {
        let volume = self.assemble(directory)?;
        sink.encode(&volume, output)?;
        Ok(volume)
    }

    fn key_slice(&self, index: usize, path: PathBuf) -> Result<KeyedSlice, AssemblyError> {
        debug!("{}", path.display());
        let slice = self.source.decode(&path)?;
        let key = self.extractor.extract_key(&slice, &path)?;

        let tag = self.extractor.tag();
        let label = StandardDataDictionary
            .by_tag(tag)
            .map_or("Unknown", |entry| entry.alias);
        debug!("{} {} = {}", tag, label, key);

        Ok(KeyedSlice {
            key,
            index,
            path,
            slice,
        })
    }
}
