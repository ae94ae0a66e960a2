use dicom::core::Tag;
use ndarray::Array2;
use std::{collections::BTreeMap, fmt, path::PathBuf};

/// In-plane geometry of a slice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SliceGeometry {
    /// (columns, rows)
    pub size: (usize, usize),
    /// (x, y) spacing in millimeters
    pub spacing: [f64; 2],
}

impl fmt::Display for SliceGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} @ {}x{}",
            self.size.0, self.size.1, self.spacing[0], self.spacing[1]
        )
    }
}

/// A decoded 2-D slice with its geometry and textual metadata.
#[derive(Clone, Debug)]
pub struct Slice {
    /// Stored pixel values laid out (rows, columns)
    pub pixels: Array2<u16>,
    pub origin: [f64; 3],
    pub spacing: [f64; 2],
    pub metadata: BTreeMap<Tag, String>,
}

impl Slice {
    pub fn new(pixels: Array2<u16>, origin: [f64; 3], spacing: [f64; 2]) -> Self {
        Self {
            pixels,
            origin,
            spacing,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, tag: Tag, value: impl Into<String>) -> Self {
        self.metadata.insert(tag, value.into());
        self
    }

    pub fn geometry(&self) -> SliceGeometry {
        let (rows, columns) = self.pixels.dim();
        SliceGeometry {
            size: (columns, rows),
            spacing: self.spacing,
        }
    }
}

/// A slice paired with its ordering key.
#[derive(Clone, Debug)]
pub struct KeyedSlice {
    pub key: f64,
    /// Position of the file in the source enumeration
    pub index: usize,
    pub path: PathBuf,
    pub slice: Slice,
}
