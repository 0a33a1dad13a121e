//! # Geometry Utilities
//!
//! Pure functions over points and rectangles. Angles are in radians and are only ever
//! consumed through `sin`/`cos`, so any value (negative, or beyond a full turn) is valid.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    /// Builds the rectangle spanned by two arbitrary corners.
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// A rectangle centered on `center`, rotated by `rotation` radians.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrientedRect {
    pub center: Vec2,
    pub half_extents: Vec2,
    pub rotation: f32,
}

impl OrientedRect {
    pub fn new(center: Vec2, size: Vec2, rotation: f32) -> Self {
        Self {
            center,
            half_extents: size * 0.5,
            rotation,
        }
    }

    /// Maps a world point into the rectangle's local, axis-aligned frame (origin at the center).
    pub fn to_local(&self, point: Vec2) -> Vec2 {
        rotate_point(point - self.center, Vec2::ZERO, -self.rotation)
    }

    /// Maps a point in the local frame back into world space.
    pub fn to_world(&self, local: Vec2) -> Vec2 {
        self.center + rotate_point(local, Vec2::ZERO, self.rotation)
    }

    /// The four corners in world space, clockwise from the local top-left.
    pub fn corners(&self) -> [Vec2; 4] {
        let h = self.half_extents;
        [
            self.to_world(Vec2::new(-h.x, -h.y)),
            self.to_world(Vec2::new(h.x, -h.y)),
            self.to_world(Vec2::new(h.x, h.y)),
            self.to_world(Vec2::new(-h.x, h.y)),
        ]
    }
}

/// Rotates `point` around `pivot` by `angle` radians.
pub fn rotate_point(point: Vec2, pivot: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    let d = point - pivot;
    pivot + Vec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos)
}

/// Returns true if `point` lies inside `rect` (boundary inclusive).
pub fn point_in_oriented_rect(point: Vec2, rect: &OrientedRect) -> bool {
    let local = rect.to_local(point);
    local.x.abs() <= rect.half_extents.x && local.y.abs() <= rect.half_extents.y
}

/// Euclidean distance between two points.
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}
