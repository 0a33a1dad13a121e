use crate::error::CanvasError;
use crate::model::{DecalGeometry, Scene, Uuid};
use crate::raster::{ImageRef, RasterImage};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A serializable representation of a Decal.
///
/// Instead of the decoded image it stores the content-addressed reference of the encoded bytes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedDecal {
    pub uuid: Uuid,
    pub source_id: String,
    pub image: ImageRef,
    pub geometry: DecalGeometry,
}

/// A serializable snapshot of the Scene, decals in paint order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedScene {
    pub background: ImageRef,
    pub decals: Vec<SavedDecal>,
}

impl SavedScene {
    /// Every image the snapshot needs, background first, without duplicates.
    pub fn image_refs(&self) -> Vec<ImageRef> {
        let mut refs = vec![self.background];
        for decal in &self.decals {
            if !refs.contains(&decal.image) {
                refs.push(decal.image);
            }
        }
        refs
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Scene {
    /// Serializes the scene into a `SavedScene` payload.
    pub fn save(&self) -> SavedScene {
        SavedScene {
            background: self.background().id(),
            decals: self
                .paint_order()
                .map(|decal| SavedDecal {
                    uuid: decal.uuid,
                    source_id: decal.source_id.clone(),
                    image: decal.image.id(),
                    geometry: decal.geometry,
                })
                .collect(),
        }
    }

    /// Rebuilds a scene from a snapshot and the decoded images it references.
    ///
    /// Fails without building anything if any referenced image is missing.
    pub fn from_saved(
        saved: &SavedScene,
        images: &HashMap<ImageRef, RasterImage>,
    ) -> Result<Scene, CanvasError> {
        let lookup = |id: &ImageRef| {
            images
                .get(id)
                .cloned()
                .ok_or(CanvasError::MissingImage(*id))
        };

        let mut scene = Scene::new(lookup(&saved.background)?);
        for decal in &saved.decals {
            let image = lookup(&decal.image)?;
            scene.push_decal(decal.uuid, decal.source_id.clone(), image, decal.geometry);
        }
        Ok(scene)
    }
}
