//! # Raster Images
//!
//! Decoded images are stored as premultiplied `tiny_skia::Pixmap`s behind an `Arc`, so cloning a
//! [`RasterImage`] never copies pixels. Every image carries an [`ImageRef`]: the BLAKE3 hash of
//! the encoded bytes it was decoded from. Snapshots persist only the reference, and the bytes
//! live in whichever store the host keeps.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tiny_skia::{ColorU8, Pixmap};

use crate::error::{DecodeError, RenderError};

/// Content-addressed reference to encoded image bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef(blake3::Hash);

impl ImageRef {
    /// Hashes encoded bytes into a reference.
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes))
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

impl fmt::Debug for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.0.to_hex();
        write!(f, "ImageRef({})", &hex[..12])
    }
}

/// A decoded raster image.
#[derive(Clone)]
pub struct RasterImage {
    id: ImageRef,
    pixmap: Arc<Pixmap>,
}

/// A raster image together with the encoded bytes its [`ImageRef`] was computed from.
#[derive(Debug)]
pub struct EncodedImage {
    pub image: RasterImage,
    pub bytes: Vec<u8>,
}

impl RasterImage {
    /// Decodes any format the `image` crate understands.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        let pixmap = pixmap_from_rgba(&rgba).ok_or(DecodeError::Empty)?;
        Ok(Self {
            id: ImageRef::of_bytes(bytes),
            pixmap: Arc::new(pixmap),
        })
    }

    /// Wraps rendered pixels, encoding them as PNG so the result is content addressable.
    pub fn encode_pixmap(pixmap: Pixmap) -> Result<EncodedImage, RenderError> {
        let bytes = pixmap
            .encode_png()
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        Ok(EncodedImage {
            image: Self {
                id: ImageRef::of_bytes(&bytes),
                pixmap: Arc::new(pixmap),
            },
            bytes,
        })
    }

    /// Wraps straight-alpha pixels, encoding them as PNG.
    pub fn encode_rgba(rgba: &image::RgbaImage) -> Result<EncodedImage, RenderError> {
        let pixmap = pixmap_from_rgba(rgba).ok_or(RenderError::Surface {
            width: rgba.width(),
            height: rgba.height(),
        })?;
        Self::encode_pixmap(pixmap)
    }

    pub fn id(&self) -> ImageRef {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn size(&self) -> glam::Vec2 {
        glam::Vec2::new(self.width() as f32, self.height() as f32)
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Converts back to straight-alpha RGBA.
    pub fn to_rgba(&self) -> image::RgbaImage {
        let mut out = image::RgbaImage::new(self.width(), self.height());
        for (dst, src) in out.pixels_mut().zip(self.pixmap.pixels()) {
            let c = src.demultiply();
            *dst = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }

    /// Straight-alpha color of one pixel, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }
}

impl fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterImage")
            .field("id", &self.id)
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

fn pixmap_from_rgba(rgba: &image::RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(rgba.width(), rgba.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}
