//! Host input events.
//!
//! The host translates its native events (DOM, winit, test scripts) into
//! these. Pointer positions are in screen space, relative to the canvas
//! element; timestamps are host milliseconds and only need to be monotonic.

use serde::{Deserialize, Serialize};

use crate::affine::Affine;
use crate::model::SkeletonId;
use crate::scene::ObjectId;
use crate::transform::Point;

/// Events the annotator responds to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Primary pointer button pressed.
    PointerDown { position: Point, timestamp_ms: u64 },
    /// Primary pointer button released.
    PointerUp { position: Point, timestamp_ms: u64 },
    /// Pointer moved, with or without a button held.
    PointerMove { position: Point, timestamp_ms: u64 },
    /// Pointer left the canvas.
    PointerOut,
    /// Wheel scrolled; positive `delta_y` scrolls down (zoom out).
    Wheel { delta_y: f64, position: Point },
    /// Periodic host timer, used for press-and-hold pan detection.
    Tick { timestamp_ms: u64 },
    /// Keyboard key pressed.
    Key { key: Key, modifiers: Modifiers },
    /// A marker is being dragged; `left`/`top` is its live anchor.
    ObjectMoving { id: ObjectId, left: f64, top: f64 },
    /// A marker drag finished at `left`/`top`.
    ObjectModified { id: ObjectId, left: f64, top: f64 },
    /// The host's hit test selected an object (created or updated).
    SelectionChanged { id: ObjectId },
    /// The selection was cleared.
    SelectionCleared,
    /// The operator moved or scaled a skeleton's composite.
    CompositeTransformed { skeleton: SkeletonId, affine: Affine },
    /// The canvas container changed size.
    ContainerResized { width: f64, height: f64 },
}

/// Keyboard keys the annotator binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Char(char),
    Delete,
    Backspace,
    Up,
    Down,
    Left,
    Right,
    Escape,
    Enter,
    Tab,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_dom_key(key: &str) -> Option<Self> {
        match key {
            "Delete" => Some(Key::Delete),
            "Backspace" => Some(Key::Backspace),
            "ArrowUp" => Some(Key::Up),
            "ArrowDown" => Some(Key::Down),
            "ArrowLeft" => Some(Key::Left),
            "ArrowRight" => Some(Key::Right),
            "Escape" => Some(Key::Escape),
            "Enter" => Some(Key::Enter),
            "Tab" => Some(Key::Tab),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Key::Char(c)),
                    _ => None,
                }
            }
        }
    }
}

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub meta: bool,
}

impl Modifiers {
    /// Any modifier other than shift is held. Shift only changes the
    /// character, so it does not block hotkeys.
    pub fn has_command_modifier(&self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}
