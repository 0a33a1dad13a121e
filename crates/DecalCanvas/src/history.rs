use crate::persistence::SavedScene;

/// Manages the Undo/Redo history of the Scene.
///
/// This implementation keeps full serialized snapshots in a single list with a cursor.
/// Committing truncates everything after the cursor (linear undo), and a snapshot whose
/// serialized form equals the entry under the cursor is not pushed.
///
/// Restoring is not done here: the images a snapshot references must be decoded first, so
/// [`crate::Canvas`] issues a restore for a target index and moves the cursor with
/// [`HistoryManager::settle`] once the scene has actually been replaced.
#[derive(Debug)]
pub struct HistoryManager {
    entries: Vec<String>,
    index: usize,
    /// Entry cap; 0 keeps everything. The initial entry is never dropped.
    pub max_history: usize,
}

impl HistoryManager {
    /// Creates a history whose floor is `initial`.
    pub fn new(initial: &SavedScene, max_history: usize) -> Result<Self, serde_json::Error> {
        Ok(Self {
            entries: vec![initial.to_json()?],
            index: 0,
            max_history,
        })
    }

    /// Discards every entry and starts again from `initial`.
    pub fn reset(&mut self, initial: &SavedScene) -> Result<(), serde_json::Error> {
        self.entries = vec![initial.to_json()?];
        self.index = 0;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position of the snapshot that matches the live scene.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Helper to check if undo is available.
    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    /// Helper to check if redo is available.
    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Records `state` after the cursor.
    ///
    /// Returns false when `state` equals the current entry and nothing was pushed.
    pub fn commit(&mut self, state: &SavedScene) -> Result<bool, serde_json::Error> {
        let json = state.to_json()?;
        if self.entries.get(self.index) == Some(&json) {
            return Ok(false);
        }

        self.entries.truncate(self.index + 1); // New timeline branch
        self.entries.push(json);
        if self.max_history > 0 && self.entries.len() > self.max_history.max(2) {
            let excess = self.entries.len() - self.max_history.max(2);
            self.entries.drain(1..=excess); // Drop oldest, keep the floor
        }
        self.index = self.entries.len() - 1;
        Ok(true)
    }

    pub fn undo_target(&self) -> Option<usize> {
        self.can_undo().then(|| self.index - 1)
    }

    pub fn redo_target(&self) -> Option<usize> {
        self.can_redo().then(|| self.index + 1)
    }

    /// Parses the snapshot stored at `index`.
    pub fn snapshot(&self, index: usize) -> Option<Result<SavedScene, serde_json::Error>> {
        self.entries.get(index).map(|json| SavedScene::from_json(json))
    }

    /// Moves the cursor after a restore of `index` has completed.
    pub fn settle(&mut self, index: usize) -> bool {
        if index < self.entries.len() {
            self.index = index;
            true
        } else {
            false
        }
    }
}
