use decal_canvas::model::Scene;
use decal_canvas::{ImageRef, RasterImage, RestoreRequest};
use futures::future::try_join_all;
use std::collections::HashMap;

use crate::error::StudioError;
use crate::services::ImageDecoder;
use crate::store::ImageStore;

/// Images the live scene already holds decoded.
pub(crate) fn live_images(scene: &Scene) -> HashMap<ImageRef, RasterImage> {
    let mut images = HashMap::new();
    images.insert(scene.background().id(), scene.background().clone());
    for decal in scene.paint_order() {
        images
            .entry(decal.image.id())
            .or_insert_with(|| decal.image.clone());
    }
    images
}

/// Resolves every image `request` needs, decoding the ones not already at hand concurrently.
///
/// Fails as a whole if any image is missing from the store or does not decode.
pub(crate) async fn load_images(
    request: &RestoreRequest,
    mut available: HashMap<ImageRef, RasterImage>,
    store: &ImageStore,
    decoder: &dyn ImageDecoder,
) -> Result<HashMap<ImageRef, RasterImage>, StudioError> {
    let needed = request.image_refs();
    let missing: Vec<ImageRef> = needed
        .iter()
        .filter(|id| !available.contains_key(id))
        .copied()
        .collect();

    tracing::debug!(
        index = request.index,
        needed = needed.len(),
        decoding = missing.len(),
        store_bytes = store.total_bytes(),
        "Loading snapshot images"
    );

    let decoded = try_join_all(missing.into_iter().map(|id| async move {
        let bytes = store.claim(&id)?;
        let image = decoder.decode(bytes).await?;
        Ok::<_, StudioError>((id, image))
    }))
    .await?;

    available.extend(decoded);
    available.retain(|id, _| needed.contains(id));
    Ok(available)
}
