use decal_canvas::{EncodedImage, ImageRef};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::StudioError;

/// Content-addressed store of encoded image bytes.
///
/// History snapshots only hold [`ImageRef`]s; this is where the bytes behind them live for the
/// rest of the session. Checking in the same bytes twice stores them once.
#[derive(Clone, Debug, Default)]
pub struct ImageStore {
    // Map hash -> encoded bytes
    storage: Arc<RwLock<HashMap<ImageRef, Arc<[u8]>>>>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check_in(&self, data: &[u8]) -> ImageRef {
        let id = ImageRef::of_bytes(data);
        let mut guard = self.storage.write().unwrap_or_else(PoisonError::into_inner);
        if !guard.contains_key(&id) {
            guard.insert(id, Arc::from(data));
            tracing::debug!(image = %id, bytes = data.len(), "Image checked in");
        }
        id
    }

    /// Checks in the bytes of an image the engine produced.
    pub fn check_in_encoded(&self, encoded: &EncodedImage) -> ImageRef {
        self.check_in(&encoded.bytes)
    }

    pub fn claim(&self, id: &ImageRef) -> Result<Arc<[u8]>, StudioError> {
        let guard = self.storage.read().unwrap_or_else(PoisonError::into_inner);
        guard
            .get(id)
            .cloned()
            .ok_or(StudioError::UnknownImage(*id))
    }

    pub fn contains(&self, id: &ImageRef) -> bool {
        let guard = self.storage.read().unwrap_or_else(PoisonError::into_inner);
        guard.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.storage
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total bytes held.
    pub fn total_bytes(&self) -> usize {
        let guard = self.storage.read().unwrap_or_else(PoisonError::into_inner);
        guard.values().map(|data| data.len()).sum()
    }
}
