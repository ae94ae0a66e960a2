use ndarray::{Array3, ArrayView2, s};

/// A stack of slices ordered along the new axis.
#[derive(Clone, Debug, PartialEq)]
pub struct Volume {
    data: Array3<u16>,
    origin: [f64; 3],
    spacing: [f64; 3],
}

impl Volume {
    pub fn new(data: Array3<u16>, origin: [f64; 3], spacing: [f64; 3]) -> Self {
        Self {
            data,
            origin,
            spacing,
        }
    }

    /// Get the dimensions of the volume (depth, height, width)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Get the size of the volume as (width, height, depth)
    pub fn size(&self) -> [usize; 3] {
        let (depth, height, width) = self.data.dim();
        [width, height, depth]
    }

    /// Get a reference to the underlying data
    pub fn data(&self) -> &Array3<u16> {
        &self.data
    }

    pub fn origin(&self) -> [f64; 3] {
        self.origin
    }

    /// Spacing as (x, y, z); z is always 1.0 since no physical spacing is
    /// derived from the ordering key.
    pub fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    /// The plane at `index` along the stacking axis.
    pub fn plane(&self, index: usize) -> Option<ArrayView2<'_, u16>> {
        (index < self.data.dim().0).then(|| self.data.slice(s![index, .., ..]))
    }
}
