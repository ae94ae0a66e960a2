//! Volume encoding.
//!
//! Volumes are written as MetaImage files with `MET_FLOAT` pixels. A `.mha`
//! output holds header and pixel data in one file; a `.mhd` output keeps the
//! header and writes the pixels to a sibling `.raw` file.
//!
//! Every file is first written to a temporary file in the output directory and
//! renamed into place once complete, so a failed or interrupted write never
//! leaves a file at the output path. For `.mhd` both files are complete before
//! either is renamed, and the `.raw` file is removed again if the header cannot
//! be put in place.

use crate::{error::AssemblyError, volume::Volume};

use std::{
    fs,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Something that can persist an assembled volume.
pub trait VolumeSink {
    /// # Errors
    ///
    /// `Encode` when the output cannot be written, `UnsupportedOutput` when the
    /// sink cannot represent the requested output.
    fn encode(&self, volume: &Volume, output: &Path) -> Result<(), AssemblyError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Layout {
    /// `.mha`
    Local,
    /// `.mhd` + `.raw`
    Detached,
}

/// Writes MetaImage files.
#[derive(Clone, Copy, Debug, Default)]
pub struct MetaImageSink;

impl MetaImageSink {
    fn layout(output: &Path) -> Option<Layout> {
        let extension = output.extension()?.to_str()?;
        if extension.eq_ignore_ascii_case("mha") {
            Some(Layout::Local)
        } else if extension.eq_ignore_ascii_case("mhd") {
            Some(Layout::Detached)
        } else {
            None
        }
    }

    /// Render the text header. `data_file` is `LOCAL` or the raw file name.
    pub fn header(volume: &Volume, data_file: &str) -> String {
        let [width, height, depth] = volume.size();
        let [ox, oy, oz] = volume.origin();
        let [sx, sy, sz] = volume.spacing();
        let msb = if cfg!(target_endian = "big") {
            "True"
        } else {
            "False"
        };

        format!(
            "ObjectType = Image\n\
             NDims = 3\n\
             BinaryData = True\n\
             BinaryDataByteOrderMSB = {msb}\n\
             CompressedData = False\n\
             TransformMatrix = 1 0 0 0 1 0 0 0 1\n\
             Offset = {ox} {oy} {oz}\n\
             CenterOfRotation = 0 0 0\n\
             AnatomicalOrientation = RAI\n\
             ElementSpacing = {sx} {sy} {sz}\n\
             DimSize = {width} {height} {depth}\n\
             ElementType = MET_FLOAT\n\
             ElementDataFile = {data_file}\n"
        )
    }

    /// Write a temporary file next to `path`, to be persisted once complete.
    fn write_temp(
        path: &Path,
        write: impl FnOnce(&mut BufWriter<&mut NamedTempFile>) -> io::Result<()>,
    ) -> io::Result<NamedTempFile> {
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(directory)?;
        {
            let mut writer = BufWriter::new(&mut file);
            write(&mut writer)?;
            writer.flush()?;
        }
        file.as_file().sync_all()?;
        Ok(file)
    }

    fn persist(file: NamedTempFile, path: &Path) -> io::Result<()> {
        file.persist(path).map_err(|err| err.error)?;
        Ok(())
    }

    /// Cast and write one plane at a time.
    fn write_pixels(writer: &mut impl Write, volume: &Volume) -> io::Result<()> {
        let [width, height, _] = volume.size();
        let mut plane_buffer = Vec::with_capacity(width * height);
        for plane in volume.data().outer_iter() {
            plane_buffer.clear();
            plane_buffer.extend(plane.iter().map(|&v| f32::from(v)));
            writer.write_all(bytemuck::cast_slice::<f32, u8>(&plane_buffer))?;
        }
        Ok(())
    }
}

impl VolumeSink for MetaImageSink {
    fn encode(&self, volume: &Volume, output: &Path) -> Result<(), AssemblyError> {
        let layout = Self::layout(output).ok_or_else(|| AssemblyError::UnsupportedOutput {
            path: output.to_path_buf(),
        })?;
        let encode_error = |path: &Path| {
            let path = path.to_path_buf();
            move |source| AssemblyError::Encode { path, source }
        };

        match layout {
            Layout::Local => {
                let file = Self::write_temp(output, |writer| {
                    writer.write_all(Self::header(volume, "LOCAL").as_bytes())?;
                    Self::write_pixels(writer, volume)
                })
                .map_err(encode_error(output))?;
                Self::persist(file, output).map_err(encode_error(output))?;
            }
            Layout::Detached => {
                let raw = raw_path(output);
                let raw_name = raw
                    .file_name()
                    .and_then(|name| name.to_str())
                    .ok_or_else(|| AssemblyError::UnsupportedOutput {
                        path: output.to_path_buf(),
                    })?
                    .to_string();

                // both files are complete before either is renamed into place
                let raw_file = Self::write_temp(&raw, |writer| Self::write_pixels(writer, volume))
                    .map_err(encode_error(&raw))?;
                let header_file = Self::write_temp(output, |writer| {
                    writer.write_all(Self::header(volume, &raw_name).as_bytes())
                })
                .map_err(encode_error(output))?;

                Self::persist(raw_file, &raw).map_err(encode_error(&raw))?;
                if let Err(err) = Self::persist(header_file, output) {
                    if let Err(cleanup) = fs::remove_file(&raw) {
                        warn!("Failed to remove {}: {}", raw.display(), cleanup);
                    }
                    return Err(encode_error(output)(err));
                }
            }
        }

        debug!("Wrote {}", output.display());
        Ok(())
    }
}

fn raw_path(header: &Path) -> PathBuf {
    header.with_extension("raw")
}
