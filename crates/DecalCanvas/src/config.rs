//! # Configuration
//!
//! This module defines the configuration struct for the Canvas.

use serde::{Deserialize, Serialize};

/// Configuration parameters for the Canvas.
///
/// Every distance is expressed in content pixels unless the field says otherwise.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Smallest width or height a decal may shrink to. Default: 20.0.
    pub min_decal_size: f32,
    /// Half-extent of the square around each handle that accepts a press. Default: 15.0.
    pub handle_hit_radius: f32,
    /// Distance of the rotate handle above the decal's top edge. Default: 25.0.
    pub rotate_handle_offset: f32,
    /// Drawn radius of the handle circles. Default: 6.0.
    pub handle_radius: f32,
    /// Multiplicative zoom step for wheel zooming. Default: 0.15 (15%).
    pub wheel_zoom_step: f32,
    /// Additive zoom step for the zoom buttons. Default: 0.25.
    pub button_zoom_step: f32,
    /// Lower bound of the view scale. Default: 0.5.
    pub min_scale: f32,
    /// Upper bound of the view scale. Default: 3.0.
    pub max_scale: f32,
    /// Width of a freshly placed decal as a fraction of the content width. Default: 0.25.
    pub placement_fraction: f32,
    /// Capture rectangles need both sides longer than this, in screen pixels. Default: 10.0.
    pub capture_min_size: f32,
    /// Maximum number of snapshots retained by the history, 0 for no limit. Default: 0.
    pub max_history: usize,
    /// Visual styling configuration.
    pub style: CanvasStyle,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            min_decal_size: 20.0,
            handle_hit_radius: 15.0,
            rotate_handle_offset: 25.0,
            handle_radius: 6.0,
            wheel_zoom_step: 0.15,
            button_zoom_step: 0.25,
            min_scale: 0.5,
            max_scale: 3.0,
            placement_fraction: 0.25,
            capture_min_size: 10.0,
            max_history: 0,
            style: CanvasStyle::default(),
        }
    }
}

/// Visual styling of the selection affordances.
///
/// Colors are RGBA in the 0.0 - 1.0 range.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasStyle {
    /// Color of the dashed outline, guide line and handle borders.
    pub accent_color: glam::Vec4,
    /// Fill of the resize handle.
    pub resize_handle_fill: glam::Vec4,
    /// Fill of the rotate handle.
    pub rotate_handle_fill: glam::Vec4,
    /// Width of the dashed outline.
    pub outline_width: f32,
    /// Dash pattern of the outline as (on, off) lengths.
    pub outline_dash: [f32; 2],
    /// Width of the handle borders and the guide line.
    pub handle_stroke_width: f32,
}

impl Default for CanvasStyle {
    fn default() -> Self {
        Self {
            accent_color: glam::Vec4::new(0.659, 0.333, 0.969, 1.0),
            resize_handle_fill: glam::Vec4::new(1.0, 1.0, 1.0, 1.0),
            rotate_handle_fill: glam::Vec4::new(0.914, 0.835, 1.0, 1.0),
            outline_width: 2.0,
            outline_dash: [5.0, 3.0],
            handle_stroke_width: 1.5,
        }
    }
}
