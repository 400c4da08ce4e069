//! Device-agnostic pointer and keyboard input.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
        alt: false,
        meta: false,
    };
}

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerPhase {
    Pressed,
    Moved,
    Released,
}

/// A mouse, pen or touch event in client (surface) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    /// Client-space position; converted to canvas space by the viewport.
    pub position: Point,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, position: Point, modifiers: Modifiers) -> Self {
        Self {
            phase,
            position,
            modifiers,
        }
    }

    pub fn pressed(x: f64, y: f64) -> Self {
        Self::new(PointerPhase::Pressed, Point::new(x, y), Modifiers::NONE)
    }

    pub fn moved(x: f64, y: f64) -> Self {
        Self::new(PointerPhase::Moved, Point::new(x, y), Modifiers::NONE)
    }

    pub fn released(x: f64, y: f64) -> Self {
        Self::new(PointerPhase::Released, Point::new(x, y), Modifiers::NONE)
    }

    /// Same event with different modifiers (builder).
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Keys the engine reacts to directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Delete the current selection.
    Delete,
    /// Abort the active session and clear the selection.
    Escape,
}
