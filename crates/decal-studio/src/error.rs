use decal_canvas::{CanvasError, DecodeError, ImageRef};
use thiserror::Error;

/// Why a fusion request produced no usable image.
#[derive(Debug, Error)]
pub enum FusionError {
    #[error("no fusion service is configured")]
    NotConfigured,
    #[error("fusion service call failed: {0:#}")]
    Service(anyhow::Error),
    #[error("fusion service returned an unusable image: {0}")]
    InvalidResponse(#[from] DecodeError),
}

#[derive(Debug, Error)]
pub enum StudioError {
    #[error("another undo or redo is still in progress")]
    HistoryBusy,
    #[error("a fusion request is already in progress")]
    FusionBusy,
    #[error("image {0} is not in the image store")]
    UnknownImage(ImageRef),
    #[error("export of '{name}' failed: {source:#}")]
    Export {
        name: String,
        source: anyhow::Error,
    },
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Canvas(#[from] CanvasError),
}
