use crate::{enums::SeriesSelection, error::AssemblyError, slice::Slice};

use dicom::{
    core::{Tag, VR},
    object::{DefaultDicomObject, OpenFileOptions, open_file},
    pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder, VoiLutOption},
};
use dicom_dictionary_std::tags;
use ndarray::{Array2, s};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

/// Something that can enumerate and decode the slices of one series.
pub trait SliceSource {
    /// List the files of the selected series in `directory`.
    ///
    /// # Errors
    ///
    /// `NotFound` if the directory holds no recognizable series.
    fn list_series(&self, directory: &Path) -> Result<Vec<PathBuf>, AssemblyError>;

    /// Decode one file into a slice.
    ///
    /// # Errors
    ///
    /// `Decode` if the file is unreadable or not a valid slice.
    fn decode(&self, file: &Path) -> Result<Slice, AssemblyError>;
}

/// Reads slices from DICOM files on disk.
#[derive(Clone, Debug, Default)]
pub struct DicomSliceSource {
    selection: SeriesSelection,
}

impl DicomSliceSource {
    pub fn new(selection: SeriesSelection) -> Self {
        Self { selection }
    }

    /// Group the DICOM files of `directory` by Series Instance UID.
    ///
    /// Series are keyed by UID and files within a series are sorted by path.
    pub fn discover(directory: &Path) -> Result<BTreeMap<String, Vec<PathBuf>>, AssemblyError> {
        let entries = fs::read_dir(directory).map_err(|err| AssemblyError::NotFound {
            directory: directory.to_path_buf(),
            reason: err.to_string(),
        })?;

        let mut series: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
        for path in entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
        {
            match Self::series_uid(&path) {
                Some(uid) => series.entry(uid).or_default().push(path),
                None => debug!("Skipping {}: not a DICOM slice", path.display()),
            }
        }

        for files in series.values_mut() {
            files.sort();
        }
        Ok(series)
    }

    fn series_uid(path: &Path) -> Option<String> {
        let header = OpenFileOptions::new()
            .read_until(tags::PIXEL_DATA)
            .open_file(path)
            .ok()?;
        let uid = header
            .element(tags::SERIES_INSTANCE_UID)
            .ok()?
            .to_str()
            .ok()?
            .trim_end_matches(['\0', ' '])
            .to_string();
        (!uid.is_empty()).then_some(uid)
    }

    fn select(
        &self,
        directory: &Path,
        mut series: BTreeMap<String, Vec<PathBuf>>,
    ) -> Result<Vec<PathBuf>, AssemblyError> {
        let not_found = |reason: String| AssemblyError::NotFound {
            directory: directory.to_path_buf(),
            reason,
        };

        match &self.selection {
            SeriesSelection::Uid(uid) => series
                .remove(uid)
                .ok_or_else(|| not_found(format!("series {uid} is not present"))),
            SeriesSelection::Single if series.len() > 1 => Err(AssemblyError::AmbiguousSeries {
                directory: directory.to_path_buf(),
                uids: series.into_keys().collect(),
            }),
            SeriesSelection::Single | SeriesSelection::First => {
                if series.len() > 1 {
                    warn!(
                        "{} series found in {}, using the first one",
                        series.len(),
                        directory.display()
                    );
                }
                let (uid, files) = series
                    .pop_first()
                    .ok_or_else(|| not_found("directory contains no DICOM files".into()))?;
                debug!("Selected series {} ({} files)", uid, files.len());
                Ok(files)
            }
        }
    }

    fn decode_pixels(object: &DefaultDicomObject) -> Result<Array2<u16>, String> {
        let pixel_data = object.decode_pixel_data().map_err(|err| err.to_string())?;
        if pixel_data.samples_per_pixel() != 1 {
            return Err(format!(
                "expected one sample per pixel, found {}",
                pixel_data.samples_per_pixel()
            ));
        }
        // stored values, untouched by rescale or windowing
        let options = ConvertOptions::new()
            .with_modality_lut(ModalityLutOption::None)
            .with_voi_lut(VoiLutOption::Identity);
        pixel_data
            .to_ndarray_with_options::<u16>(&options)
            .map(|arr| arr.slice_move(s![0, .., .., 0]))
            .map_err(|err| err.to_string())
    }

    fn origin(object: &DefaultDicomObject) -> [f64; 3] {
        object
            .element(tags::IMAGE_POSITION_PATIENT)
            .ok()
            .and_then(|element| element.to_multi_float64().ok())
            .filter(|position| position.len() >= 3)
            .map_or([0.0; 3], |position| [position[0], position[1], position[2]])
    }

    fn spacing(object: &DefaultDicomObject) -> [f64; 2] {
        // Pixel Spacing is (row spacing, column spacing), i.e. (y, x)
        object
            .element(tags::PIXEL_SPACING)
            .ok()
            .and_then(|element| element.to_multi_float64().ok())
            .filter(|spacing| spacing.len() >= 2)
            .map_or([1.0, 1.0], |spacing| [spacing[1], spacing[0]])
    }

    fn metadata(object: &DefaultDicomObject) -> BTreeMap<Tag, String> {
        object
            .iter()
            .filter(|element| {
                let header = element.header();
                header.tag != tags::PIXEL_DATA && is_textual(header.vr)
            })
            .filter_map(|element| {
                let value = element.to_str().ok()?;
                Some((
                    element.header().tag,
                    value.trim_end_matches(['\0', ' ']).to_string(),
                ))
            })
            .collect()
    }
}

impl SliceSource for DicomSliceSource {
    fn list_series(&self, directory: &Path) -> Result<Vec<PathBuf>, AssemblyError> {
        let series = Self::discover(directory)?;
        self.select(directory, series)
    }

    fn decode(&self, file: &Path) -> Result<Slice, AssemblyError> {
        let decode_error = |reason: String| AssemblyError::Decode {
            path: file.to_path_buf(),
            reason,
        };

        let object = open_file(file).map_err(|err| decode_error(err.to_string()))?;
        let pixels = Self::decode_pixels(&object).map_err(decode_error)?;

        Ok(Slice {
            pixels,
            origin: Self::origin(&object),
            spacing: Self::spacing(&object),
            metadata: Self::metadata(&object),
        })
    }
}

fn is_textual(vr: VR) -> bool {
    !matches!(
        vr,
        VR::OB | VR::OD | VR::OF | VR::OL | VR::OV | VR::OW | VR::SQ | VR::UN
    )
}
