//! # angio-volume
//!
//! Assembles a time-ordered volume from a folder of DICOM slices and writes it
//! as a single MetaImage file.
//!
//! Angiography series (MRA) are acquired as a set of slices, each taken at a
//! different time, and the order of the files on disk does not follow the
//! acquisition. The slices are ordered by Content Time `(0008,0033)` so that
//! plane `i` of the output volume is the `i`-th acquired slice.
//!
//! The pipeline is all-or-nothing: a slice that cannot be decoded, a missing
//! or unparseable ordering tag, or a slice whose size or spacing differs from
//! the others aborts the run before anything is written.
//!
//! Assumptions about the input:
//!  - One series per run (see [`SeriesSelection`] when a folder holds several)
//!  - No multiframe (always the first frame is used)
//!  - Single sample per pixel, stored values up to 16 bits
//!
//! The along-axis spacing of the output is always 1: no physical spacing is
//! derived from the acquisition times.
//!
//! # Examples
//!
//! ```no_run
//! # use angio_volume::{DicomSliceSource, MetaImageSink, SeriesAssembler, SeriesSelection};
//! # use std::path::Path;
//! let assembler = SeriesAssembler::new(DicomSliceSource::new(SeriesSelection::First));
//! let volume = assembler
//!     .assemble_into(Path::new("dicom"), &MetaImageSink, Path::new("angio.mha"))
//!     .expect("should have written the volume");
//! println!("{:?}", volume.size());
//! ```

pub mod assembler;
pub mod config;
pub mod enums;
pub mod error;
pub mod ordering_key;
pub mod slice;
pub mod slice_source;
pub mod volume;
pub mod volume_sink;

pub use assembler::{STACK_SPACING, Series, SeriesAssembler};
pub use enums::{Execution, KeyParsing, SeriesSelection};
pub use error::AssemblyError;
pub use ordering_key::{DEFAULT_ORDERING_TAG, OrderingKeyExtractor};
pub use slice::{KeyedSlice, Slice, SliceGeometry};
pub use slice_source::{DicomSliceSource, SliceSource};
pub use volume::Volume;
pub use volume_sink::{MetaImageSink, VolumeSink};
