//! # Viewport System
//!
//! This module handles the pan/zoom presentation of the canvas element.
//! It maps between Screen Space (pointer pixels) and Content Space (pixels of the backing raster).
//!
//! The view transform is display only: the element is scaled by `scale` around its visual
//! center and shifted by `offset` screen pixels. Content coordinates stored in decals never change
//! when the view does.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::math::Rect;

/// Represents the current camera state: how much the element is scaled and where it is shifted.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// The scale factor.
    /// - 1.0 = 100% scale.
    /// - Greater than 1.0 = Zoomed In.
    /// - Less than 1.0 = Zoomed Out.
    pub scale: f32,
    /// Translation of the element in screen pixels.
    pub offset: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: Vec2::ZERO,
        }
    }
}

impl Transform {
    pub fn is_identity(&self) -> bool {
        self.scale == 1.0 && self.offset == Vec2::ZERO
    }
}

/// Where the canvas element sits on screen before the view transform is applied.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanvasLayout {
    /// Screen position of the untransformed element's top-left corner.
    pub origin: Vec2,
    /// On-screen (CSS) size of the untransformed element.
    pub css_size: Vec2,
    /// Screen position of the container that region captures are measured in.
    pub container_origin: Vec2,
}

impl CanvasLayout {
    /// A layout where the element is shown at its native content size at the screen origin.
    pub fn native(content_size: Vec2) -> Self {
        Self {
            origin: Vec2::ZERO,
            css_size: content_size,
            container_origin: Vec2::ZERO,
        }
    }
}

/// The View struct combines the Transform with the element layout and content size.
/// It serves as the single source of truth for coordinate conversions.
#[derive(Clone, Debug)]
pub struct View {
    /// The camera transform.
    pub transform: Transform,
    /// Untransformed placement of the canvas element.
    pub layout: CanvasLayout,
    /// Size of the backing raster in content pixels.
    pub content_size: Vec2,
    min_scale: f32,
    max_scale: f32,
}

impl View {
    /// Creates a new View with the identity transform.
    pub fn new(layout: CanvasLayout, content_size: Vec2, min_scale: f32, max_scale: f32) -> Self {
        Self {
            transform: Transform::default(),
            layout,
            content_size,
            min_scale,
            max_scale,
        }
    }

    pub fn is_zoomed(&self) -> bool {
        self.transform.scale != 1.0
    }

    /// Content pixels per CSS pixel, per axis.
    pub fn css_ratio(&self) -> Vec2 {
        self.content_size / self.layout.css_size
    }

    /// Screen position of the element's visual center (after the offset is applied).
    pub fn visual_center(&self) -> Vec2 {
        self.layout.origin + self.layout.css_size * 0.5 + self.transform.offset
    }

    /// The element's bounding box on screen after the view transform.
    pub fn displayed_rect(&self) -> Rect {
        let size = self.layout.css_size * self.transform.scale;
        Rect::new(self.visual_center() - size * 0.5, size)
    }

    /// Zooms by one wheel step toward (`direction > 0`) or away from the viewer, keeping the
    /// content under `screen_point` fixed on screen.
    ///
    /// Returns false if the clamp left the scale unchanged.
    pub fn zoom_at(&mut self, screen_point: Vec2, direction: f32, step: f32) -> bool {
        let old_scale = self.transform.scale;
        let factor = if direction > 0.0 { 1.0 + step } else { 1.0 - step };
        let new_scale = (old_scale * factor).clamp(self.min_scale, self.max_scale);
        if new_scale == old_scale {
            return false;
        }

        // offset' = offset + (p - center) * (1 - s'/s)
        let center = self.visual_center();
        let ratio = new_scale / old_scale;
        self.transform.offset += (screen_point - center) * (1.0 - ratio);
        self.transform.scale = new_scale;
        true
    }

    /// Adds `amount` to the scale around the element's center (zoom buttons).
    ///
    /// Returns false if the clamp left the scale unchanged.
    pub fn zoom_by(&mut self, amount: f32) -> bool {
        let old_scale = self.transform.scale;
        let new_scale = (old_scale + amount).clamp(self.min_scale, self.max_scale);
        if new_scale == old_scale {
            return false;
        }
        self.transform.scale = new_scale;
        true
    }

    /// Shifts the element by a screen-space delta.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.transform.offset += delta;
    }

    pub fn reset(&mut self) {
        self.transform = Transform::default();
    }

    /// Converts a raw pointer position to **Content Space**.
    ///
    /// Step 1 applies the CSS-to-content ratio as if the element were untransformed.
    /// Step 2 undoes the pan/zoom, which acts around the content center:
    /// `content = raw + (raw - center) * (1/scale - 1) - offset_content / scale`.
    /// With the identity transform step 2 returns `raw` unchanged.
    pub fn screen_to_content(&self, screen_pos: Vec2) -> Vec2 {
        let ratio = self.css_ratio();
        let raw = (screen_pos - self.layout.origin) * ratio;

        let center = self.content_size * 0.5;
        let scale = self.transform.scale;
        let offset = self.transform.offset * ratio;
        raw + (raw - center) * (1.0 / scale - 1.0) - offset / scale
    }

    /// Converts a point from **Content Space** to **Screen Space**.
    pub fn content_to_screen(&self, content_pos: Vec2) -> Vec2 {
        let ratio = self.css_ratio();
        let center = self.content_size * 0.5;
        let scale = self.transform.scale;
        let offset = self.transform.offset * ratio;
        let raw = content_pos + (content_pos - center) * (scale - 1.0) + offset;
        self.layout.origin + raw / ratio
    }
}
