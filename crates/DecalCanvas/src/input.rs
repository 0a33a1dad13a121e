//! # Input Protocol
//!
//! This module defines the pointer events the host application forwards to the Canvas, and the
//! cursor affordance the Canvas asks the host to show.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A pointer event. Positions are in Screen Space (viewport pixels).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    /// The primary button was pressed.
    Down(Vec2),
    /// The pointer moved, with or without a button held.
    Move(Vec2),
    /// The primary button was released.
    Up(Vec2),
    /// A wheel tick. Positive `delta` zooms in.
    Wheel { pos: Vec2, delta: f32 },
}

/// Cursor shape the host should display.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CursorIcon {
    #[default]
    Default,
    /// Over a decal body or a handle of the selected decal.
    Move,
    /// Over empty canvas while zoomed; a press would pan.
    Grab,
    /// Panning the view.
    Grabbing,
    /// Region capture mode.
    Crosshair,
}
