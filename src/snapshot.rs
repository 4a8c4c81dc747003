use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::error::{Error, Result};
use crate::surface::DrawingSurface;

/// A snapshot that has been completely written to disk.
///
/// Only [`save_snapshot`] hands these out, and only after the file has been
/// flushed and synced, so holding one means the file at [`Snapshot::path`] can
/// be read back safely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    path: PathBuf,
    width: u32,
    height: u32,
}

impl Snapshot {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Wraps a reference image that already exists on disk and was not
    /// produced in this run. The size is read from the file's header.
    pub(crate) fn existing(path: PathBuf) -> Result<Self> {
        let (width, height) = image::image_dimensions(&path).map_err(|source| match source {
            image::ImageError::IoError(source) => Error::Read {
                path: path.clone(),
                source,
            },
            source => Error::Decode {
                path: path.clone(),
                source,
            },
        })?;
        Ok(Self {
            path,
            width,
            height,
        })
    }
}

/// Reads back the surface and writes it to `path` as a PNG, replacing any
/// existing file.
///
/// `width` and `height` must equal the surface size; anything else is
/// rejected with [`Error::SizeMismatch`] instead of producing a truncated
/// image.
pub async fn save_snapshot(
    surface: &DrawingSurface,
    width: u32,
    height: u32,
    path: impl AsRef<Path>,
) -> Result<Snapshot> {
    let path = path.as_ref();
    if surface.size() != (width, height) {
        return Err(Error::SizeMismatch {
            requested: (width, height),
            surface: surface.size(),
        });
    }

    let pixels = surface.read_pixels().await?;
    write_png(path, &pixels, width, height)?;

    log::debug!("Wrote {}x{} snapshot to {}", width, height, path.display());

    Ok(Snapshot {
        path: path.to_path_buf(),
        width,
        height,
    })
}

fn write_png(path: &Path, pixels: &[u8], width: u32, height: u32) -> Result<()> {
    let write_error = |source| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(write_error)?;
    let mut writer = BufWriter::new(file);
    PngEncoder::new(&mut writer)
        .write_image(pixels, width, height, ExtendedColorType::Rgba8)
        .map_err(|source| match source {
            image::ImageError::IoError(source) => write_error(source),
            source => Error::Encode {
                path: path.to_path_buf(),
                source,
            },
        })?;

    writer.flush().map_err(write_error)?;
    let file = writer
        .into_inner()
        .map_err(|error| write_error(error.into_error()))?;
    file.sync_all().map_err(write_error)
}
