use std::io;
use std::path::PathBuf;

use crate::harness::Stage;

/// Errors produced while creating a surface, taking snapshots or comparing them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No GPU adapter could be found for headless rendering.
    #[error("no suitable GPU adapter for headless rendering: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),
    /// The adapter refused to hand out a device.
    #[error("failed to open GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    /// The requested surface size is zero or exceeds the device limits.
    #[error("invalid surface size {width}x{height} (limit {limit})")]
    InvalidSize { width: u32, height: u32, limit: u32 },
    /// Reading the surface back would need a buffer larger than the device allows.
    #[error("surface {width}x{height} needs a {bytes} byte readback buffer (limit {limit})")]
    ReadbackTooLarge {
        width: u32,
        height: u32,
        bytes: u64,
        limit: u64,
    },
    /// A snapshot was requested with dimensions other than the surface's.
    #[error(
        "snapshot size {}x{} does not match surface size {}x{}",
        .requested.0, .requested.1, .surface.0, .surface.1
    )]
    SizeMismatch {
        requested: (u32, u32),
        surface: (u32, u32),
    },
    /// Mapping or polling the readback buffer failed.
    #[error("pixel readback failed: {0}")]
    Readback(String),
    #[error("failed to write snapshot {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode snapshot {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to read image {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode image {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    /// The two images being compared have different dimensions.
    #[error(
        "image dimensions differ: expected {}x{}, actual {}x{}",
        .expected.0, .expected.1, .actual.0, .actual.1
    )]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
    /// A harness step was invoked from the wrong stage.
    #[error("cannot {action} while the harness is in stage {found:?} (expected {expected:?})")]
    OutOfOrder {
        action: &'static str,
        expected: Stage,
        found: Stage,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
