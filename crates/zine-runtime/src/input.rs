//! Pointer state tracking

use crate::event::InputEvent;
use glam::Vec2;
use std::collections::HashSet;

/// Tracks pointer position and button state between frames
#[derive(Debug, Clone, Default)]
pub struct PointerState {
    /// Last known pointer position; `None` until the first pointer event
    position: Option<Vec2>,
    /// Buttons currently held down
    buttons_down: HashSet<u32>,
    /// Buttons pressed since the last `end_frame`
    buttons_just_pressed: HashSet<u32>,
    /// Pointer movement accumulated since the last `end_frame`
    delta: Vec2,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the state. Resize events are ignored.
    pub fn process(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::PointerMove { position, .. } | InputEvent::Click { position, .. } => {
                self.move_to(position)
            }
            InputEvent::PointerDown {
                position, button, ..
            } => {
                self.move_to(position);
                if self.buttons_down.insert(button) {
                    self.buttons_just_pressed.insert(button);
                }
            }
            InputEvent::PointerUp {
                position, button, ..
            } => {
                self.move_to(position);
                self.buttons_down.remove(&button);
            }
            InputEvent::Resize { .. } => {}
        }
    }

    fn move_to(&mut self, position: Vec2) {
        if !position.is_finite() {
            return;
        }
        if let Some(prev) = self.position {
            self.delta += position - prev;
        }
        self.position = Some(position);
    }

    /// Call at end of frame to clear per-frame state
    pub fn end_frame(&mut self) {
        self.buttons_just_pressed.clear();
        self.delta = Vec2::ZERO;
    }

    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    /// Movement since the last `end_frame`
    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    /// Is any button currently held?
    pub fn is_pressed(&self) -> bool {
        !self.buttons_down.is_empty()
    }

    pub fn is_button_down(&self, button: u32) -> bool {
        self.buttons_down.contains(&button)
    }

    pub fn is_button_just_pressed(&self, button: u32) -> bool {
        self.buttons_just_pressed.contains(&button)
    }
}
