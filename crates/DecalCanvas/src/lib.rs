//! # DecalCanvas
//!
//! `decal_canvas` is a headless compositing engine for placing decal images on top of a
//! background raster. It owns the scene, the pan/zoom view, the pointer state machine and the
//! snapshot history, and it renders either a display list or finished pixels.
//!
//! ## Core Architecture
//! - **Model (`src/model.rs`)**: Stores decals in a flat arena (SlotMap) plus an explicit z-order.
//! - **View (`src/view.rs`)**: Handles coordinate transformation (Content <-> Screen).
//! - **Interaction (`src/interaction.rs`)**: Pointer state machine (move, resize, rotate, pan).
//! - **History (`src/history.rs`)**: Serialized snapshots with linear undo/redo.
//! - **Render (`src/render.rs`, `src/painter.rs`)**: Display list and its rasterization.
//!
//! Nothing in this crate performs I/O. Decoding image bytes is synchronous
//! ([`RasterImage::decode`]); hosts that want it off the main thread run it themselves, which is
//! why restores are split into [`Canvas::begin_undo`] and [`Canvas::finish_restore`].

pub mod capture;
pub mod config;
pub mod error;
pub mod history;
pub mod input;
pub mod interaction;
pub mod math;
pub mod model;
pub mod painter;
pub mod persistence;
pub mod raster;
pub mod render;
pub mod view;

use glam::Vec2;
use std::collections::HashMap;
use tiny_skia::Pixmap;

use capture::{CaptureBox, CaptureState};
use history::HistoryManager;
use math::Rect;
use model::{Decal, DecalGeometry, DecalId, Scene, Uuid};
use painter::Painter;
use persistence::SavedScene;
use render::RenderList;
use view::{CanvasLayout, View};

// Re-exports for convenience
pub use config::{CanvasConfig, CanvasStyle};
pub use error::{CanvasError, CaptureError, DecodeError, RenderError};
pub use input::{CursorIcon, PointerEvent};
pub use interaction::{InteractionKind, InteractionMode, LogicEvent};
pub use raster::{EncodedImage, ImageRef, RasterImage};

/// A restore issued by [`Canvas::begin_undo`] or [`Canvas::begin_redo`].
///
/// The host loads every image in [`RestoreRequest::image_refs`] and hands them back to
/// [`Canvas::finish_restore`]. A request is only honored if no other restore or scene replacement
/// was issued in between.
#[derive(Clone, Debug)]
pub struct RestoreRequest {
    /// History position being restored.
    pub index: usize,
    /// Generation the request was issued in.
    pub generation: u64,
    /// The snapshot to rebuild.
    pub snapshot: SavedScene,
}

impl RestoreRequest {
    pub fn image_refs(&self) -> Vec<ImageRef> {
        self.snapshot.image_refs()
    }
}

/// The main entry point for the library.
///
/// The `Canvas` owns the live scene and everything that edits it. It is intended to be
/// instantiated once per editing session; [`Canvas::reset_scene`] swaps the background.
pub struct Canvas {
    /// Configuration settings.
    pub config: CanvasConfig,
    /// The Viewport system handling coordinate transforms.
    pub view: View,
    scene: Scene,
    history: HistoryManager,
    selection: Option<DecalId>,
    interaction_mode: InteractionMode,
    capture: CaptureState,
    removal_target: Option<Rect>,
    processing: bool,
    generation: u64,
}

impl Canvas {
    /// Creates a Canvas over `background` and commits the initial, decal-free snapshot.
    pub fn new(
        config: CanvasConfig,
        background: RasterImage,
        layout: CanvasLayout,
    ) -> Result<Self, CanvasError> {
        let scene = Scene::new(background);
        let history = HistoryManager::new(&scene.save(), config.max_history)?;
        let view = View::new(
            layout,
            scene.content_size(),
            config.min_scale,
            config.max_scale,
        );

        tracing::info!(
            width = scene.background().width(),
            height = scene.background().height(),
            "Canvas created"
        );

        Ok(Self {
            config,
            view,
            scene,
            history,
            selection: None,
            interaction_mode: InteractionMode::Idle,
            capture: CaptureState::Inactive,
            removal_target: None,
            processing: false,
            generation: 0,
        })
    }

    // --- Read access ---

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn selection(&self) -> Option<DecalId> {
        self.selection
    }

    pub fn selected_decal(&self) -> Option<&Decal> {
        self.selection.and_then(|id| self.scene.decal(id))
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn interaction_mode(&self) -> &InteractionMode {
        &self.interaction_mode
    }

    pub fn interaction_kind(&self) -> InteractionKind {
        self.interaction_mode.kind()
    }

    /// True while a decal is being dragged over the removal target.
    pub fn pending_delete(&self) -> bool {
        matches!(
            self.interaction_mode,
            InteractionMode::Moving {
                over_removal_target: true,
                ..
            }
        )
    }

    pub fn is_capturing(&self) -> bool {
        self.capture.is_active()
    }

    /// The capture rectangle being dragged, in container-local pixels.
    pub fn capture_box(&self) -> Option<CaptureBox> {
        match self.capture {
            CaptureState::Drawing(b) => Some(b),
            _ => None,
        }
    }

    /// Generation of the most recent restore or scene replacement.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // --- Layout ---

    /// Updates where the canvas element and its container sit on screen.
    pub fn set_layout(&mut self, layout: CanvasLayout) {
        self.view.layout = layout;
    }

    /// Sets the screen rectangle that deletes a decal dropped onto it.
    pub fn set_removal_target(&mut self, target: Option<Rect>) {
        self.removal_target = target;
    }

    // --- Pointer input ---

    /// Dispatches a pointer event to the matching handler.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Vec<LogicEvent> {
        match event {
            PointerEvent::Down(pos) => self.pointer_down(pos),
            PointerEvent::Move(pos) => self.pointer_move(pos),
            PointerEvent::Up(pos) => self.pointer_up(pos),
            PointerEvent::Wheel { pos, delta } => self.wheel(pos, delta),
        }
    }

    pub fn pointer_down(&mut self, screen_pos: Vec2) -> Vec<LogicEvent> {
        let mut events = Vec::new();
        if self.processing {
            return events;
        }

        if self.capture.is_active() {
            let local = screen_pos - self.view.layout.container_origin;
            self.capture = CaptureState::Drawing(CaptureBox {
                start: local,
                current: local,
            });
            events.push(LogicEvent::RepaintNeeded);
            return events;
        }
        if !self.interaction_mode.is_idle() {
            return events;
        }

        self.interaction_mode = interaction::handle_pointer_down(
            &self.view,
            &self.config,
            &self.scene,
            &mut self.selection,
            screen_pos,
            &mut events,
        );
        tracing::debug!(mode = ?self.interaction_mode.kind(), "Pointer down");
        events
    }

    pub fn pointer_move(&mut self, screen_pos: Vec2) -> Vec<LogicEvent> {
        let mut events = Vec::new();

        if let CaptureState::Drawing(ref mut b) = self.capture {
            b.current = screen_pos - self.view.layout.container_origin;
            events.push(LogicEvent::RepaintNeeded);
            return events;
        }

        interaction::handle_pointer_move(
            &mut self.interaction_mode,
            &mut self.view,
            &self.config,
            &mut self.scene,
            self.removal_target,
            screen_pos,
            &mut events,
        );
        events
    }

    pub fn pointer_up(&mut self, screen_pos: Vec2) -> Vec<LogicEvent> {
        let mut events = Vec::new();

        if let CaptureState::Drawing(mut b) = self.capture {
            b.current = screen_pos - self.view.layout.container_origin;
            self.capture = CaptureState::Inactive;
            let rect = b.rect();
            if capture::is_accidental(&rect, self.config.capture_min_size) {
                tracing::debug!(?rect, "Capture rectangle discarded");
            } else {
                events.push(LogicEvent::CaptureReady(rect));
            }
            events.push(LogicEvent::RepaintNeeded);
            return events;
        }

        let kind = self.interaction_mode.kind();
        let needs_commit = interaction::handle_pointer_up(
            &mut self.interaction_mode,
            &mut self.scene,
            &mut self.selection,
            &mut events,
        );
        if needs_commit {
            tracing::debug!(mode = ?kind, "Interaction finished");
            self.commit_into(&mut events);
        }
        events
    }

    /// Zooms toward the cursor. Positive `delta` zooms in. Ignored while capturing.
    pub fn wheel(&mut self, screen_pos: Vec2, delta: f32) -> Vec<LogicEvent> {
        if delta == 0.0 || self.capture.is_active() {
            return Vec::new();
        }
        let step = self.config.wheel_zoom_step;
        if self.view.zoom_at(screen_pos, delta, step) {
            vec![LogicEvent::ViewChanged, LogicEvent::RepaintNeeded]
        } else {
            Vec::new()
        }
    }

    /// Cursor the host should show for a pointer at `screen_pos`.
    pub fn hover_cursor(&self, screen_pos: Vec2) -> CursorIcon {
        if self.capture.is_active() {
            return CursorIcon::Crosshair;
        }
        match self.interaction_mode {
            InteractionMode::PanningView { .. } => CursorIcon::Grabbing,
            InteractionMode::Idle => interaction::hover_cursor(
                &self.view,
                &self.config,
                &self.scene,
                self.selection,
                screen_pos,
            ),
            _ => CursorIcon::Move,
        }
    }

    // --- Scene operations ---

    pub fn clear_selection(&mut self) -> Vec<LogicEvent> {
        if self.selection.take().is_some() {
            vec![LogicEvent::SelectionChanged(None), LogicEvent::RepaintNeeded]
        } else {
            Vec::new()
        }
    }

    /// Places a decal centered on the drop point, selects it and commits a snapshot.
    ///
    /// The decal is `placement_fraction` of the content width wide, keeps the image's aspect
    /// ratio, and is never smaller than `min_decal_size` on either side.
    pub fn place_decal(
        &mut self,
        source_id: impl Into<String>,
        image: RasterImage,
        drop_screen_point: Vec2,
    ) -> Result<(DecalId, Vec<LogicEvent>), CanvasError> {
        if self.processing {
            return Err(CanvasError::Processing);
        }
        if self.capture.is_active() {
            return Err(CanvasError::Capturing);
        }
        if image.width() == 0 || image.height() == 0 {
            return Err(DecodeError::Empty.into());
        }

        let center = self.view.screen_to_content(drop_screen_point);
        let width = self.scene.content_size().x * self.config.placement_fraction;
        let aspect = image.height() as f32 / image.width() as f32;
        let geometry = DecalGeometry {
            center,
            size: Vec2::new(width, width * aspect),
            rotation: 0.0,
        }
        .floored(self.config.min_decal_size);

        let uuid = Uuid::new_v4();
        let source_id = source_id.into();
        tracing::info!(%uuid, source = %source_id, x = center.x, y = center.y, "Placing decal");
        let id = self.scene.push_decal(uuid, source_id, image, geometry);

        let mut events = Vec::new();
        self.selection = Some(id);
        events.push(LogicEvent::SelectionChanged(Some(id)));
        self.commit_into(&mut events);
        events.push(LogicEvent::RepaintNeeded);
        Ok((id, events))
    }

    /// Deletes the selected decal and commits. Returns no events if nothing was selected.
    pub fn remove_selected(&mut self) -> Result<Vec<LogicEvent>, CanvasError> {
        if self.processing {
            return Err(CanvasError::Processing);
        }
        let mut events = Vec::new();
        let Some(id) = self.selection.take() else {
            return Ok(events);
        };
        if let Some(removed) = self.scene.remove_decal(id) {
            tracing::info!(uuid = %removed.uuid, "Removed selected decal");
            events.push(LogicEvent::DecalRemoved {
                id,
                uuid: removed.uuid,
            });
        }
        events.push(LogicEvent::SelectionChanged(None));
        self.commit_into(&mut events);
        events.push(LogicEvent::RepaintNeeded);
        Ok(events)
    }

    /// Replaces the whole scene with an empty one over `background`.
    ///
    /// History restarts from the new scene and the view returns to identity. Any restore still in
    /// flight is invalidated.
    pub fn reset_scene(&mut self, background: RasterImage) -> Result<Vec<LogicEvent>, CanvasError> {
        if self.processing {
            return Err(CanvasError::Processing);
        }
        let scene = Scene::new(background);
        self.history.reset(&scene.save())?;
        self.replace_scene(scene);
        self.view.reset();
        tracing::info!(generation = self.generation, "Scene reset");
        Ok(vec![
            LogicEvent::SelectionChanged(None),
            LogicEvent::ViewChanged,
            LogicEvent::RepaintNeeded,
        ])
    }

    // --- View operations ---

    pub fn zoom_in(&mut self) -> bool {
        self.view.zoom_by(self.config.button_zoom_step)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.view.zoom_by(-self.config.button_zoom_step)
    }

    pub fn reset_zoom(&mut self) {
        self.view.reset();
    }

    // --- Region capture ---

    /// Enters capture mode. The selection is cleared so it never shows in a crop.
    ///
    /// Placement, wheel zoom and history navigation are refused until the capture ends.
    pub fn begin_region_capture(&mut self) -> Result<(), CanvasError> {
        if self.processing {
            return Err(CanvasError::Processing);
        }
        self.selection = None;
        self.interaction_mode = InteractionMode::Idle;
        self.capture = CaptureState::Armed;
        Ok(())
    }

    pub fn cancel_region_capture(&mut self) {
        self.capture = CaptureState::Inactive;
    }

    /// Extracts the content pixels under a container-local rectangle.
    ///
    /// Returns `Ok(None)` for a rectangle too small to be intentional. Never mutates the scene.
    pub fn end_region_capture(&mut self, rect: Rect) -> Result<Option<EncodedImage>, CanvasError> {
        self.capture = CaptureState::Inactive;
        if capture::is_accidental(&rect, self.config.capture_min_size) {
            return Ok(None);
        }

        let region = capture::map_to_content(&rect, &self.view);
        let composite = self.rasterize(None)?;
        let pixels = capture::extract(&composite, region)?;
        let encoded = RasterImage::encode_pixmap(pixels).map_err(CaptureError::from)?;
        tracing::info!(
            x = region.x,
            y = region.y,
            width = region.width,
            height = region.height,
            "Region captured"
        );
        Ok(Some(encoded))
    }

    // --- Rendering ---

    /// Display list of the scene with the selection affordances.
    pub fn render(&self) -> RenderList {
        Painter::draw_scene(&self.scene, self.selection, self.processing, &self.config)
    }

    /// Pixels of the scene with the selection affordances, at content resolution.
    pub fn render_frame(&self) -> Result<Pixmap, CanvasError> {
        self.rasterize(self.selection)
    }

    /// The composite with the selection hidden, encoded as PNG.
    pub fn current_composite(&self) -> Result<EncodedImage, CanvasError> {
        let pixels = self.rasterize(None)?;
        Ok(RasterImage::encode_pixmap(pixels)?)
    }

    fn rasterize(&self, selection: Option<DecalId>) -> Result<Pixmap, CanvasError> {
        let list = Painter::draw_scene(&self.scene, selection, self.processing, &self.config);
        let background = self.scene.background();
        Ok(Painter::rasterize(&list, background.width(), background.height())?)
    }

    // --- History ---

    /// Records the live scene. Returns true if a new entry was appended.
    ///
    /// A commit supersedes any restore still in flight.
    pub fn commit(&mut self) -> Result<bool, CanvasError> {
        let pushed = self.history.commit(&self.scene.save())?;
        if pushed {
            self.generation += 1;
            tracing::debug!(index = self.history.index(), "History committed");
        }
        Ok(pushed)
    }

    fn commit_into(&mut self, events: &mut Vec<LogicEvent>) {
        match self.commit() {
            Ok(true) => events.push(LogicEvent::HistoryCommitted {
                index: self.history.index(),
            }),
            Ok(false) => {}
            Err(e) => tracing::warn!(error = %e, "Failed to record history snapshot"),
        }
    }

    /// Issues a restore of the previous snapshot, or `None` at the start of history.
    pub fn begin_undo(&mut self) -> Result<Option<RestoreRequest>, CanvasError> {
        let target = self.history.undo_target();
        self.begin_restore(target)
    }

    /// Issues a restore of the next snapshot, or `None` at the end of history.
    pub fn begin_redo(&mut self) -> Result<Option<RestoreRequest>, CanvasError> {
        let target = self.history.redo_target();
        self.begin_restore(target)
    }

    fn begin_restore(
        &mut self,
        target: Option<usize>,
    ) -> Result<Option<RestoreRequest>, CanvasError> {
        if self.processing {
            return Err(CanvasError::Processing);
        }
        if self.capture.is_active() {
            return Err(CanvasError::Capturing);
        }
        let Some(index) = target else {
            return Ok(None);
        };
        let snapshot = self
            .history
            .snapshot(index)
            .ok_or(CanvasError::UnknownSnapshot(index))??;

        self.generation += 1;
        tracing::debug!(index, generation = self.generation, "Restore issued");
        Ok(Some(RestoreRequest {
            index,
            generation: self.generation,
            snapshot,
        }))
    }

    /// Completes a restore with the decoded images its snapshot references.
    ///
    /// The live scene is only replaced once every image is present. The selection is kept if the
    /// selected decal exists in the snapshot.
    pub fn finish_restore(
        &mut self,
        request: RestoreRequest,
        images: &HashMap<ImageRef, RasterImage>,
    ) -> Result<Vec<LogicEvent>, CanvasError> {
        if request.generation != self.generation {
            tracing::warn!(
                stale = request.generation,
                current = self.generation,
                "Discarding superseded restore"
            );
            return Err(CanvasError::StaleRestore(request.generation));
        }

        let scene = Scene::from_saved(&request.snapshot, images)?;
        if !self.history.settle(request.index) {
            return Err(CanvasError::UnknownSnapshot(request.index));
        }

        let selected_uuid = self.selected_decal().map(|d| d.uuid);
        let previous = self.selection;
        self.scene = scene;
        self.view.content_size = self.scene.content_size();
        self.interaction_mode = InteractionMode::Idle;
        self.selection = selected_uuid.and_then(|uuid| self.scene.find_by_uuid(uuid));

        tracing::info!(index = request.index, "History restored");
        let mut events = Vec::new();
        if self.selection != previous {
            events.push(LogicEvent::SelectionChanged(self.selection));
        }
        events.push(LogicEvent::RepaintNeeded);
        Ok(events)
    }

    // --- Processing ---

    /// Marks a fusion request as outstanding. Returns false if one already is.
    ///
    /// While processing, pointer presses and scene edits are refused and the affordances are
    /// hidden.
    pub fn begin_processing(&mut self) -> bool {
        if self.processing {
            return false;
        }
        self.processing = true;
        self.interaction_mode = InteractionMode::Idle;
        self.capture = CaptureState::Inactive;
        tracing::debug!("Processing started");
        true
    }

    /// Flattens the scene: `image` becomes the background, every decal and the selection are
    /// dropped, and a snapshot is committed.
    ///
    /// The image is expected at content size already; it is adopted as-is.
    pub fn adopt_background(&mut self, image: RasterImage) -> Result<Vec<LogicEvent>, CanvasError> {
        self.replace_scene(Scene::new(image));
        let mut events = vec![LogicEvent::SelectionChanged(None)];
        self.commit_into(&mut events);
        events.push(LogicEvent::RepaintNeeded);
        tracing::info!(index = self.history.index(), "Background adopted");
        Ok(events)
    }

    /// Clears the processing flag. Returns false if it was already clear.
    pub fn end_processing(&mut self) -> bool {
        let was = std::mem::replace(&mut self.processing, false);
        if was {
            tracing::debug!("Processing finished");
        }
        was
    }

    fn replace_scene(&mut self, scene: Scene) {
        self.scene = scene;
        self.view.content_size = self.scene.content_size();
        self.selection = None;
        self.interaction_mode = InteractionMode::Idle;
        self.capture = CaptureState::Inactive;
        self.generation += 1;
    }
}
