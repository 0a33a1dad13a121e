//! # Rendering System
//!
//! This module acts as the "Instruction Set Architecture" of the canvas surface.
//! The [`crate::painter::Painter`] first lowers the scene into a display list of `DrawCommand`s
//! and then rasterizes that list; hosts with their own 2D backend can consume the list directly.

use glam::{Vec2, Vec4};

use crate::raster::RasterImage;

/// A single drawing primitive.
///
/// Coordinates are in **Content Space** (pixels of the backing raster).
#[derive(Clone, Debug)]
pub enum DrawCommand {
    /// Reset the whole surface to transparent.
    Clear,
    /// An image drawn unscaled with its top-left at the content origin.
    Background {
        image: RasterImage,
    },
    /// An image stretched into a rotated box.
    Image {
        image: RasterImage,
        /// Center of the box.
        center: Vec2,
        /// Width and height of the box.
        size: Vec2,
        /// Rotation in radians around `center`.
        rotation: f32,
    },
    /// The stroked outline of a rotated box.
    Outline {
        center: Vec2,
        size: Vec2,
        rotation: f32,
        color: Vec4,
        width: f32,
        /// Optional (on, off) dash lengths.
        dash: Option<[f32; 2]>,
    },
    /// A straight line segment.
    Line {
        start: Vec2,
        end: Vec2,
        color: Vec4,
        width: f32,
    },
    /// A filled circle with a border.
    Handle {
        center: Vec2,
        radius: f32,
        fill: Vec4,
        stroke: Vec4,
        stroke_width: f32,
    },
}

/// A list of draw commands representing the current frame.
pub type RenderList = Vec<DrawCommand>;
