//! Input events delivered by an `EventTarget`

use glam::Vec2;
use zine_core::ViewportSize;

/// Which event stream a listener subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PointerMove,
    PointerDown,
    PointerUp,
    Click,
    Resize,
}

/// An input event. `time_ms` is the host's event timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMove { position: Vec2, time_ms: f64 },
    PointerDown { position: Vec2, button: u32, time_ms: f64 },
    PointerUp { position: Vec2, button: u32, time_ms: f64 },
    Click { position: Vec2, time_ms: f64 },
    Resize { size: ViewportSize, time_ms: f64 },
}

impl InputEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            InputEvent::PointerMove { .. } => EventKind::PointerMove,
            InputEvent::PointerDown { .. } => EventKind::PointerDown,
            InputEvent::PointerUp { .. } => EventKind::PointerUp,
            InputEvent::Click { .. } => EventKind::Click,
            InputEvent::Resize { .. } => EventKind::Resize,
        }
    }

    pub fn time_ms(&self) -> f64 {
        match *self {
            InputEvent::PointerMove { time_ms, .. }
            | InputEvent::PointerDown { time_ms, .. }
            | InputEvent::PointerUp { time_ms, .. }
            | InputEvent::Click { time_ms, .. }
            | InputEvent::Resize { time_ms, .. } => time_ms,
        }
    }

    /// Pointer position for pointer events, `None` for resize
    pub fn position(&self) -> Option<Vec2> {
        match *self {
            InputEvent::PointerMove { position, .. }
            | InputEvent::PointerDown { position, .. }
            | InputEvent::PointerUp { position, .. }
            | InputEvent::Click { position, .. } => Some(position),
            InputEvent::Resize { .. } => None,
        }
    }
}
