//! # Region Capture
//!
//! Maps a rectangle drawn in the canvas container's local frame onto content pixels and copies
//! those pixels out of a rendered composite.
//!
//! The mapping goes through the element's displayed bounding box (which already includes the
//! pan/zoom), so the user crops exactly what they see while the copy always reads true content
//! pixels rather than a zoomed presentation.

use glam::Vec2;
use tiny_skia::{Pixmap, PixmapPaint, Transform};

use crate::error::CaptureError;
use crate::math::Rect;
use crate::view::View;

/// The rectangle being drawn, in container-local screen pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaptureBox {
    pub start: Vec2,
    pub current: Vec2,
}

impl CaptureBox {
    pub fn rect(&self) -> Rect {
        Rect::from_corners(self.start, self.current)
    }
}

/// Region capture mode of the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum CaptureState {
    /// Pointer input drives decals and the view.
    #[default]
    Inactive,
    /// Capture mode is on, waiting for the first press.
    Armed,
    /// A rectangle is being dragged out.
    Drawing(CaptureBox),
}

impl CaptureState {
    pub fn is_active(&self) -> bool {
        !matches!(self, CaptureState::Inactive)
    }
}

/// A rectangle of content pixels. The origin may be negative or past the content edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentRegion {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl ContentRegion {
    /// True if at least one pixel of the region lies on a `width` x `height` surface.
    pub fn overlaps(&self, width: u32, height: u32) -> bool {
        let right = self.x as i64 + self.width as i64;
        let bottom = self.y as i64 + self.height as i64;
        right > 0 && bottom > 0 && (self.x as i64) < width as i64 && (self.y as i64) < height as i64
    }
}

/// Returns true unless both sides of `rect` are longer than `min_size` screen pixels.
pub fn is_accidental(rect: &Rect, min_size: f32) -> bool {
    let size = rect.size();
    size.x <= min_size || size.y <= min_size
}

/// Converts a container-local rectangle into the content pixels it covers.
pub fn map_to_content(rect: &Rect, view: &View) -> ContentRegion {
    let displayed = view.displayed_rect();
    let ratio = view.content_size / displayed.size();

    let screen_min = view.layout.container_origin + rect.min;
    let source = (screen_min - displayed.min) * ratio;
    let size = rect.size() * ratio;

    ContentRegion {
        x: source.x.floor() as i32,
        y: source.y.floor() as i32,
        width: size.x.round().max(1.0) as u32,
        height: size.y.round().max(1.0) as u32,
    }
}

/// Copies `region` out of `composite` into a buffer of exactly the region's size.
///
/// Pixels of the region that fall outside the composite are left transparent.
pub fn extract(composite: &Pixmap, region: ContentRegion) -> Result<Pixmap, CaptureError> {
    if !region.overlaps(composite.width(), composite.height()) {
        return Err(CaptureError::OutOfBounds);
    }

    let mut out = Pixmap::new(region.width, region.height).ok_or(CaptureError::Allocation {
        width: region.width,
        height: region.height,
    })?;
    out.draw_pixmap(
        -region.x,
        -region.y,
        composite.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
    Ok(out)
}
