//! Collaborators the studio talks to: image decoding, the fusion service and export sinks.

use anyhow::Context;
use async_trait::async_trait;
use decal_canvas::{DecodeError, RasterImage};
use std::path::PathBuf;
use std::sync::Arc;

/// Turns encoded bytes into a raster.
#[async_trait]
pub trait ImageDecoder: Send + Sync {
    async fn decode(&self, bytes: Arc<[u8]>) -> Result<RasterImage, DecodeError>;
}

/// Decodes on tokio's blocking pool so large images never stall the runtime.
#[derive(Clone, Copy, Debug, Default)]
pub struct BlockingDecoder;

#[async_trait]
impl ImageDecoder for BlockingDecoder {
    async fn decode(&self, bytes: Arc<[u8]>) -> Result<RasterImage, DecodeError> {
        tokio::task::spawn_blocking(move || RasterImage::decode(&bytes))
            .await
            .map_err(|_| DecodeError::Interrupted)?
    }
}

/// The composite handed to a fusion service.
#[derive(Clone, Debug)]
pub struct FusionRequest {
    /// Encoded composite.
    pub data: Vec<u8>,
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
    /// Instruction for the service.
    pub prompt: String,
}

pub const DEFAULT_FUSION_PROMPT: &str = "This image shows a photo with decal designs overlaid on \
it. Make the decals look photorealistic, as if they were part of the surface. Match texture, \
lighting, shading and curvature. Do not change anything else. Keep high resolution.";

/// External image-to-image service that blends the overlays into the background.
///
/// Implementations return the encoded bytes of the generated image.
#[async_trait]
pub trait FusionService: Send + Sync {
    async fn fuse(&self, request: FusionRequest) -> anyhow::Result<Vec<u8>>;
}

/// Destination for exported images.
#[async_trait]
pub trait ExportSink: Send + Sync {
    /// Delivers `image` under the suggested `file_name`.
    async fn emit(&self, image: &RasterImage, file_name: &str) -> anyhow::Result<()>;
}

/// Writes exports into a directory, encoding by the file name's extension.
#[derive(Clone, Debug)]
pub struct DirectoryExportSink {
    dir: PathBuf,
}

impl DirectoryExportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }
}

#[async_trait]
impl ExportSink for DirectoryExportSink {
    async fn emit(&self, image: &RasterImage, file_name: &str) -> anyhow::Result<()> {
        let path = self.dir.join(file_name);
        let format = image::ImageFormat::from_path(&path)
            .with_context(|| format!("Unsupported export format for '{}'", file_name))?;

        let rgba = image.to_rgba();
        let bytes = tokio::task::spawn_blocking(move || encode(rgba, format))
            .await
            .context("Export encoder task failed")??;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create '{}'", self.dir.display()))?;
        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("Failed to write '{}'", path.display()))?;

        tracing::info!(path = %path.display(), bytes = bytes.len(), "Image exported");
        Ok(())
    }
}

/// Encodes straight-alpha pixels; formats without alpha get the RGB channels only.
pub(crate) fn encode(
    rgba: image::RgbaImage,
    format: image::ImageFormat,
) -> anyhow::Result<Vec<u8>> {
    let mut out = std::io::Cursor::new(Vec::new());
    match format {
        image::ImageFormat::Jpeg => {
            let rgb = image::DynamicImage::ImageRgba8(rgba).to_rgb8();
            rgb.write_to(&mut out, format)?;
        }
        _ => rgba.write_to(&mut out, format)?,
    }
    Ok(out.into_inner())
}
