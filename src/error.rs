use dicom::core::Tag;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while assembling a series into a volume.
///
/// Every variant is fatal to the run: the pipeline never produces partial
/// output and never retries.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// No recognizable series (or no files for the selected series).
    #[error("No DICOM series found in {}: {reason}", directory.display())]
    NotFound { directory: PathBuf, reason: String },

    /// More than one series found while a single one was required.
    #[error(
        "Found {} series in {}, expected exactly one: {}",
        uids.len(),
        directory.display(),
        uids.join(", ")
    )]
    AmbiguousSeries {
        directory: PathBuf,
        uids: Vec<String>,
    },

    #[error("Failed to decode slice {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("Tag {tag} not found in the DICOM header of {}", path.display())]
    MissingTag { path: PathBuf, tag: Tag },

    #[error("Tag {tag} of {} is not a number: {value:?}", path.display())]
    MalformedTag {
        path: PathBuf,
        tag: Tag,
        value: String,
    },

    /// Slice size or spacing differs from the first sorted slice.
    #[error(
        "Inconsistent slice geometry in {}: expected {expected}, found {found}",
        path.display()
    )]
    GeometryMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    #[error("Error while writing the volume as {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output extension does not name a supported container.
    #[error("Unsupported output format for {} (expected .mha or .mhd)", path.display())]
    UnsupportedOutput { path: PathBuf },
}
