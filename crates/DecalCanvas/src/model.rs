//! # Scene Model
//!
//! The live scene: one background raster plus the placed decals.
//! Decals live in a `SlotMap` arena; their stacking lives in `draw_order`.
//!
//! ## Z-order invariant
//! `draw_order` is the single source of stacking. Index 0 is painted first (bottom) and the last
//! entry is painted last (top). Hit-testing walks `draw_order` in reverse so the visually topmost
//! decal wins. Every decal in the arena appears exactly once in `draw_order`.
//!
//! Mutation is crate-private: the interaction state machine and the history restore path in
//! [`crate::Canvas`] are the only writers.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};

use crate::math::{self, OrientedRect};
use crate::raster::RasterImage;

pub use uuid::Uuid;

new_key_type! {
    /// Runtime identifier for a placed decal.
    pub struct DecalId;
}

/// Position, size and orientation of a decal in Content Space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecalGeometry {
    /// Center of the decal.
    pub center: Vec2,
    /// Width and height of the decal's box.
    pub size: Vec2,
    /// Rotation in radians, measured from the decal's local up axis.
    pub rotation: f32,
}

impl DecalGeometry {
    pub fn oriented_rect(&self) -> OrientedRect {
        OrientedRect::new(self.center, self.size, self.rotation)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        math::point_in_oriented_rect(point, &self.oriented_rect())
    }

    /// The resize handle sits on the local bottom-right corner.
    pub fn resize_handle_local(&self) -> Vec2 {
        self.size * 0.5
    }

    /// The rotate handle sits `offset` above the local top edge.
    pub fn rotate_handle_local(&self, offset: f32) -> Vec2 {
        Vec2::new(0.0, -self.size.y * 0.5 - offset)
    }

    pub fn resize_handle(&self) -> Vec2 {
        self.oriented_rect().to_world(self.resize_handle_local())
    }

    pub fn rotate_handle(&self, offset: f32) -> Vec2 {
        self.oriented_rect().to_world(self.rotate_handle_local(offset))
    }

    /// Half of the box diagonal, the reference length for uniform resizing.
    pub fn half_diagonal(&self) -> f32 {
        (self.size * 0.5).length()
    }

    /// Returns a copy with both sides raised to at least `min`.
    pub fn floored(mut self, min: f32) -> Self {
        self.size = self.size.max(Vec2::splat(min));
        self
    }
}

/// A placed overlay image.
#[derive(Clone, Debug)]
pub struct Decal {
    /// Self-reference ID.
    pub id: DecalId,
    /// Stable instance id, kept across undo/redo.
    pub uuid: Uuid,
    /// Identifier of the library entry the decal was placed from.
    pub source_id: String,
    /// The decoded image drawn in the decal's box.
    pub image: RasterImage,
    /// Where and how the decal is drawn.
    pub geometry: DecalGeometry,
}

/// The background raster plus the ordered decals.
#[derive(Clone, Debug)]
pub struct Scene {
    background: RasterImage,
    decals: SlotMap<DecalId, Decal>,
    draw_order: Vec<DecalId>,
}

impl Scene {
    /// Creates an empty scene over `background`.
    pub fn new(background: RasterImage) -> Self {
        Self {
            background,
            decals: SlotMap::with_key(),
            draw_order: Vec::new(),
        }
    }

    pub fn background(&self) -> &RasterImage {
        &self.background
    }

    /// Size of the content raster (the background's size).
    pub fn content_size(&self) -> Vec2 {
        self.background.size()
    }

    pub fn len(&self) -> usize {
        self.draw_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draw_order.is_empty()
    }

    pub fn decal(&self, id: DecalId) -> Option<&Decal> {
        self.decals.get(id)
    }

    pub fn find_by_uuid(&self, uuid: Uuid) -> Option<DecalId> {
        self.paint_order().find(|d| d.uuid == uuid).map(|d| d.id)
    }

    /// Decals bottom to top.
    pub fn paint_order(&self) -> impl DoubleEndedIterator<Item = &Decal> + '_ {
        self.draw_order.iter().filter_map(|&id| self.decals.get(id))
    }

    /// Decals top to bottom, the order hit-testing uses.
    pub fn hit_order(&self) -> impl Iterator<Item = &Decal> + '_ {
        self.paint_order().rev()
    }

    /// Topmost decal whose body contains `point`.
    pub fn hit_test(&self, point: Vec2) -> Option<DecalId> {
        self.hit_order()
            .find(|d| d.geometry.contains(point))
            .map(|d| d.id)
    }

    /// Inserts a decal on top of the stack.
    pub(crate) fn push_decal(
        &mut self,
        uuid: Uuid,
        source_id: String,
        image: RasterImage,
        geometry: DecalGeometry,
    ) -> DecalId {
        let id = self.decals.insert_with_key(|key| Decal {
            id: key,
            uuid,
            source_id,
            image,
            geometry,
        });
        self.draw_order.push(id);
        id
    }

    pub(crate) fn remove_decal(&mut self, id: DecalId) -> Option<Decal> {
        let decal = self.decals.remove(id)?;
        self.draw_order.retain(|&d| d != id);
        Some(decal)
    }

    pub(crate) fn geometry_mut(&mut self, id: DecalId) -> Option<&mut DecalGeometry> {
        self.decals.get_mut(id).map(|d| &mut d.geometry)
    }
}
