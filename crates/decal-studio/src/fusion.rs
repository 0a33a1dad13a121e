//! # Fusion
//!
//! A fusion request flattens the decals into the background through an external service.
//! It runs in three steps so the canvas lock is never held while the service works:
//! [`crate::DecalStudio::begin_fusion`] marks the canvas busy and renders the composite,
//! [`FusionJob::run`] talks to the service, and [`crate::DecalStudio::finish_fusion`] adopts
//! the result (or the unmodified composite) and clears the busy flag.

use decal_canvas::{EncodedImage, RasterImage};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use std::sync::Arc;

use crate::config::StudioConfig;
use crate::error::{FusionError, StudioError};
use crate::services::{DEFAULT_FUSION_PROMPT, FusionRequest, FusionService, ImageDecoder};

/// An image returned by the service, with the bytes it was decoded from.
#[derive(Debug)]
pub struct FusedImage {
    pub image: RasterImage,
    pub bytes: Arc<[u8]>,
}

/// An outstanding fusion request.
pub struct FusionJob {
    composite: EncodedImage,
    request: FusionRequest,
    service: Option<Arc<dyn FusionService>>,
    decoder: Arc<dyn ImageDecoder>,
}

/// What a [`FusionJob`] produced. The composite is kept for the fallback.
pub struct FusionOutcome {
    pub composite: EncodedImage,
    pub result: Result<FusedImage, FusionError>,
}

impl FusionJob {
    pub(crate) fn new(
        composite: EncodedImage,
        request: FusionRequest,
        service: Option<Arc<dyn FusionService>>,
        decoder: Arc<dyn ImageDecoder>,
    ) -> Self {
        Self {
            composite,
            request,
            service,
            decoder,
        }
    }

    /// The full-resolution composite, selection hidden.
    pub fn composite(&self) -> &RasterImage {
        &self.composite.image
    }

    /// What will be sent to the service.
    pub fn request(&self) -> &FusionRequest {
        &self.request
    }

    #[tracing::instrument(
        skip(self),
        fields(width = self.request.width, height = self.request.height)
    )]
    pub async fn run(self) -> FusionOutcome {
        let Self {
            composite,
            request,
            service,
            decoder,
        } = self;

        let result = match service {
            None => Err(FusionError::NotConfigured),
            Some(service) => match service.fuse(request).await {
                Ok(bytes) => {
                    let bytes: Arc<[u8]> = Arc::from(bytes);
                    decoder
                        .decode(bytes.clone())
                        .await
                        .map(|image| FusedImage { image, bytes })
                        .map_err(FusionError::from)
                }
                Err(e) => Err(FusionError::Service(e)),
            },
        };

        match &result {
            Ok(fused) => tracing::info!(
                width = fused.image.width(),
                height = fused.image.height(),
                "Fusion service returned an image"
            ),
            Err(e) => tracing::warn!(error = %e, "Fusion produced no image"),
        }
        FusionOutcome { composite, result }
    }
}

/// Downscales the composite to fit `fusion_max_dimension` and encodes it as JPEG.
pub(crate) fn prepare_request(
    composite: &RasterImage,
    config: &StudioConfig,
) -> Result<FusionRequest, StudioError> {
    let rgba = composite.to_rgba();
    let (width, height) = fit_within(rgba.width(), rgba.height(), config.fusion_max_dimension);
    let scaled = if (width, height) == rgba.dimensions() {
        rgba
    } else {
        image::imageops::resize(&rgba, width, height, FilterType::Triangle)
    };

    let rgb = image::DynamicImage::ImageRgba8(scaled).to_rgb8();
    let mut data = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(
        &mut data,
        config.fusion_jpeg_quality,
    ))?;

    Ok(FusionRequest {
        data,
        mime_type: "image/jpeg",
        width,
        height,
        prompt: DEFAULT_FUSION_PROMPT.to_string(),
    })
}

/// Brings a fused image to the content size, so adopting it never changes the canvas size.
pub(crate) fn fit_to_content(
    fused: FusedImage,
    width: u32,
    height: u32,
) -> Result<EncodedImage, StudioError> {
    if fused.image.width() == width && fused.image.height() == height {
        return Ok(EncodedImage {
            image: fused.image,
            bytes: fused.bytes.to_vec(),
        });
    }

    let resized = image::imageops::resize(
        &fused.image.to_rgba(),
        width,
        height,
        FilterType::Triangle,
    );
    let encoded = RasterImage::encode_rgba(&resized).map_err(decal_canvas::CanvasError::from)?;
    Ok(encoded)
}

/// Largest size with the same aspect ratio whose longer side is at most `max`.
pub(crate) fn fit_within(width: u32, height: u32, max: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max || max == 0 {
        return (width, height);
    }
    let scale = max as f64 / longest as f64;
    let w = ((width as f64 * scale).round() as u32).max(1);
    let h = ((height as f64 * scale).round() as u32).max(1);
    (w, h)
}
