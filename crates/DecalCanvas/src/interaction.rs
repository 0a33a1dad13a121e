use glam::Vec2;
use std::f32::consts::FRAC_PI_2;

use crate::config::CanvasConfig;
use crate::input::CursorIcon;
use crate::math::{self, Rect};
use crate::model::{DecalGeometry, DecalId, Scene, Uuid};
use crate::view::View;

/// Events emitted by the Canvas logic to the host application.
#[derive(Clone, Debug, PartialEq)]
pub enum LogicEvent {
    /// The selected decal changed.
    SelectionChanged(Option<DecalId>),
    /// A pointer press started a manipulation.
    InteractionStarted(InteractionKind),
    /// The dragged decal entered or left the removal target.
    PendingDeleteChanged(bool),
    /// A decal was deleted.
    DecalRemoved { id: DecalId, uuid: Uuid },
    /// A snapshot was appended to the history.
    HistoryCommitted { index: usize },
    /// The pan/zoom changed.
    ViewChanged,
    /// A capture rectangle (container-local) was released and should be extracted.
    CaptureReady(Rect),
    /// The scene visual state has changed, requiring a repaint.
    /// This is useful for power efficiency (e.g., only render when dirty).
    RepaintNeeded,
}

/// The manipulation a press resolved to, without its baseline data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    None,
    Move,
    Resize,
    Rotate,
    PanView,
}

/// The current state of user interaction.
///
/// Every manipulating state carries the decal's geometry and the pointer position captured at
/// press time. Moves are always computed against this baseline, never accumulated.
#[derive(Clone, Debug, Default)]
pub enum InteractionMode {
    /// No active interaction.
    #[default]
    Idle,
    /// User is dragging a decal.
    Moving {
        decal: DecalId,
        baseline: DecalGeometry,
        /// Pointer position at press time (Content Space).
        start_pointer: Vec2,
        /// Whether the pointer is currently over the removal target.
        over_removal_target: bool,
    },
    /// User is dragging the resize handle.
    Resizing {
        decal: DecalId,
        baseline: DecalGeometry,
        start_pointer: Vec2,
    },
    /// User is dragging the rotate handle.
    Rotating {
        decal: DecalId,
        baseline: DecalGeometry,
        start_pointer: Vec2,
    },
    /// User is panning the zoomed view.
    PanningView {
        /// Last pointer position (Screen Space).
        last_screen: Vec2,
    },
}

impl InteractionMode {
    pub fn kind(&self) -> InteractionKind {
        match self {
            InteractionMode::Idle => InteractionKind::None,
            InteractionMode::Moving { .. } => InteractionKind::Move,
            InteractionMode::Resizing { .. } => InteractionKind::Resize,
            InteractionMode::Rotating { .. } => InteractionKind::Rotate,
            InteractionMode::PanningView { .. } => InteractionKind::PanView,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionMode::Idle)
    }
}

/// A selection handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handle {
    Rotate,
    Resize,
}

/// Tests the handles of a decal. The rotate handle has priority.
///
/// Each handle accepts presses inside a square of half-extent `handle_hit_radius` in the decal's
/// local frame, regardless of the decal's size.
pub fn hit_test_handles(g: &DecalGeometry, point: Vec2, config: &CanvasConfig) -> Option<Handle> {
    let local = g.oriented_rect().to_local(point);
    let r = config.handle_hit_radius;
    let near = |handle: Vec2| (local.x - handle.x).abs() < r && (local.y - handle.y).abs() < r;

    if near(g.rotate_handle_local(config.rotate_handle_offset)) {
        Some(Handle::Rotate)
    } else if near(g.resize_handle_local()) {
        Some(Handle::Resize)
    } else {
        None
    }
}

/// Resolves a press into the next interaction mode.
///
/// Resolution order:
/// 1. a handle of the selected decal -> `Rotating` / `Resizing`
/// 2. the topmost decal body -> select it, `Moving`
/// 3. empty canvas -> clear selection, `PanningView` when zoomed, otherwise `Idle`
pub(crate) fn handle_pointer_down(
    view: &View,
    config: &CanvasConfig,
    scene: &Scene,
    selection: &mut Option<DecalId>,
    screen_pos: Vec2,
    events: &mut Vec<LogicEvent>,
) -> InteractionMode {
    let pointer = view.screen_to_content(screen_pos);

    // Hit Test Handles FIRST (Priority)
    if let Some(id) = *selection
        && let Some(decal) = scene.decal(id)
    {
        let baseline = decal.geometry;
        match hit_test_handles(&baseline, pointer, config) {
            Some(Handle::Rotate) => {
                events.push(LogicEvent::InteractionStarted(InteractionKind::Rotate));
                return InteractionMode::Rotating {
                    decal: id,
                    baseline,
                    start_pointer: pointer,
                };
            }
            Some(Handle::Resize) => {
                events.push(LogicEvent::InteractionStarted(InteractionKind::Resize));
                return InteractionMode::Resizing {
                    decal: id,
                    baseline,
                    start_pointer: pointer,
                };
            }
            None => {}
        }
    }

    // Hit test decal bodies, front to back
    if let Some(id) = scene.hit_test(pointer)
        && let Some(decal) = scene.decal(id)
    {
        if *selection != Some(id) {
            *selection = Some(id);
            events.push(LogicEvent::SelectionChanged(Some(id)));
        }
        events.push(LogicEvent::InteractionStarted(InteractionKind::Move));
        events.push(LogicEvent::RepaintNeeded);
        return InteractionMode::Moving {
            decal: id,
            baseline: decal.geometry,
            start_pointer: pointer,
            over_removal_target: false,
        };
    }

    // Clicked on empty space
    if selection.take().is_some() {
        events.push(LogicEvent::SelectionChanged(None));
        events.push(LogicEvent::RepaintNeeded);
    }
    if view.is_zoomed() {
        events.push(LogicEvent::InteractionStarted(InteractionKind::PanView));
        InteractionMode::PanningView {
            last_screen: screen_pos,
        }
    } else {
        InteractionMode::Idle
    }
}

/// Applies a pointer move to the active interaction.
///
/// This is the hot path: pure arithmetic and one geometry write, no allocation beyond events.
pub(crate) fn handle_pointer_move(
    mode: &mut InteractionMode,
    view: &mut View,
    config: &CanvasConfig,
    scene: &mut Scene,
    removal_target: Option<Rect>,
    screen_pos: Vec2,
    events: &mut Vec<LogicEvent>,
) {
    match mode {
        InteractionMode::Idle => {}
        InteractionMode::PanningView { last_screen } => {
            view.pan_by(screen_pos - *last_screen);
            *last_screen = screen_pos;
            events.push(LogicEvent::ViewChanged);
        }
        InteractionMode::Moving {
            decal,
            baseline,
            start_pointer,
            over_removal_target,
        } => {
            let over = removal_target.is_some_and(|target| target.contains(screen_pos));
            if over != *over_removal_target {
                *over_removal_target = over;
                events.push(LogicEvent::PendingDeleteChanged(over));
            }

            let pointer = view.screen_to_content(screen_pos);
            if let Some(g) = scene.geometry_mut(*decal) {
                g.center = baseline.center + (pointer - *start_pointer);
                events.push(LogicEvent::RepaintNeeded);
            }
        }
        InteractionMode::Resizing {
            decal, baseline, ..
        } => {
            let pointer = view.screen_to_content(screen_pos);
            if let Some(g) = scene.geometry_mut(*decal) {
                let reference = baseline.half_diagonal();
                if reference > 0.0 {
                    let factor = math::distance(pointer, g.center) / reference;
                    g.size = (baseline.size * factor).max(Vec2::splat(config.min_decal_size));
                    events.push(LogicEvent::RepaintNeeded);
                }
            }
        }
        InteractionMode::Rotating { decal, .. } => {
            let pointer = view.screen_to_content(screen_pos);
            if let Some(g) = scene.geometry_mut(*decal) {
                let d = pointer - g.center;
                // The rotate handle sits on the local up axis, a quarter turn from +x.
                g.rotation = d.y.atan2(d.x) + FRAC_PI_2;
                events.push(LogicEvent::RepaintNeeded);
            }
        }
    }
}

/// Finishes the active interaction and returns to `Idle`.
///
/// Returns true if a manipulation was active, meaning the caller must commit a snapshot.
pub(crate) fn handle_pointer_up(
    mode: &mut InteractionMode,
    scene: &mut Scene,
    selection: &mut Option<DecalId>,
    events: &mut Vec<LogicEvent>,
) -> bool {
    let finished = std::mem::take(mode);
    match finished {
        InteractionMode::Idle => false,
        InteractionMode::Moving {
            decal,
            over_removal_target: true,
            ..
        } => {
            if let Some(removed) = scene.remove_decal(decal) {
                tracing::info!(
                    decal = ?decal,
                    uuid = %removed.uuid,
                    "Decal dropped on removal target"
                );
                events.push(LogicEvent::DecalRemoved {
                    id: decal,
                    uuid: removed.uuid,
                });
            }
            if selection.take().is_some() {
                events.push(LogicEvent::SelectionChanged(None));
            }
            events.push(LogicEvent::PendingDeleteChanged(false));
            events.push(LogicEvent::RepaintNeeded);
            true
        }
        _ => true,
    }
}

/// Cursor affordance for a pointer hovering while no interaction is active.
pub fn hover_cursor(
    view: &View,
    config: &CanvasConfig,
    scene: &Scene,
    selection: Option<DecalId>,
    screen_pos: Vec2,
) -> CursorIcon {
    let pointer = view.screen_to_content(screen_pos);

    let over_handle = selection
        .and_then(|id| scene.decal(id))
        .is_some_and(|d| hit_test_handles(&d.geometry, pointer, config).is_some());

    if over_handle || scene.hit_test(pointer).is_some() {
        CursorIcon::Move
    } else if view.is_zoomed() {
        CursorIcon::Grab
    } else {
        CursorIcon::Default
    }
}
