use thiserror::Error;

use crate::raster::ImageRef;

/// Failure to turn encoded bytes into a [`crate::raster::RasterImage`].
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("image data could not be decoded: {0}")]
    Malformed(#[from] image::ImageError),
    #[error("image has zero width or height")]
    Empty,
    #[error("image of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },
    #[error("decode task was interrupted before it completed")]
    Interrupted,
}

/// Failure while extracting a region of the composite.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("selection lies outside the canvas content")]
    OutOfBounds,
    #[error("could not allocate a {width}x{height} capture buffer")]
    Allocation { width: u32, height: u32 },
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Failure while rasterizing a display list or encoding its pixels.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("could not allocate a {width}x{height} surface")]
    Surface { width: u32, height: u32 },
    #[error("failed to encode pixels: {0}")]
    Encode(String),
}

/// Errors surfaced by the [`crate::Canvas`] engine.
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("the canvas is busy processing a fusion request")]
    Processing,
    #[error("a region capture is in progress")]
    Capturing,
    #[error("no restore is pending for generation {0}")]
    StaleRestore(u64),
    #[error("snapshot {0} is not part of the history")]
    UnknownSnapshot(usize),
    #[error("snapshot references image {0} which was not supplied")]
    MissingImage(ImageRef),
    #[error("failed to encode or parse a snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Render(#[from] RenderError),
}
