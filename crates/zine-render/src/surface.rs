//! The immediate-mode drawing surface contract

use crate::paint::{Paint, StrokeStyle};
use kurbo::{Affine, BezPath, Rect, Shape};
use zine_core::{BlendMode, ViewportSize};

/// A 2D drawing surface with canvas semantics.
///
/// State (`global_alpha`, blend mode, transform) is saved and restored as a
/// stack. Everything drawn is mixed in with the current blend mode, scaled
/// by the current global alpha.
pub trait Surface {
    /// Pixel size of the surface
    fn size(&self) -> ViewportSize;

    /// False once the surface has been removed from its host
    fn is_attached(&self) -> bool;

    /// Push the current draw state
    fn save(&mut self);

    /// Pop back to the last saved draw state; no-op on an empty stack
    fn restore(&mut self);

    fn global_alpha(&self) -> f32;

    fn set_global_alpha(&mut self, alpha: f32);

    fn blend_mode(&self) -> BlendMode;

    fn set_blend_mode(&mut self, mode: BlendMode);

    /// Pre-multiply `affine` onto the current transform
    fn transform(&mut self, affine: Affine);

    /// Reset every pixel to fully transparent
    fn clear(&mut self);

    fn fill(&mut self, path: &BezPath, paint: &Paint);

    fn stroke(&mut self, path: &BezPath, style: &StrokeStyle, paint: &Paint);

    /// Fill an axis-aligned rectangle in user space
    fn fill_rect(&mut self, rect: Rect, paint: &Paint) {
        self.fill(&rect.to_path(0.1), paint);
    }
}

/// Transform, alpha and blend mode in effect for the next draw
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawState {
    pub transform: Affine,
    pub alpha: f32,
    pub blend: BlendMode,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            alpha: 1.0,
            blend: BlendMode::Normal,
        }
    }
}

/// Save/restore bookkeeping shared by the surface implementations
#[derive(Clone, Debug, Default)]
pub struct StateStack {
    current: DrawState,
    saved: Vec<DrawState>,
}

impl StateStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &DrawState {
        &self.current
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn save(&mut self) {
        self.saved.push(self.current);
    }

    pub fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.current = state;
        }
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.current.alpha = if alpha.is_finite() {
            alpha.clamp(0.0, 1.0)
        } else {
            1.0
        };
    }

    pub fn set_blend(&mut self, mode: BlendMode) {
        self.current.blend = mode;
    }

    pub fn transform(&mut self, affine: Affine) {
        self.current.transform = self.current.transform * affine;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Vec2;

    #[test]
    fn restore_pops_saved_state() {
        let mut stack = StateStack::new();
        stack.save();
        stack.set_alpha(0.25);
        stack.set_blend(BlendMode::Screen);
        stack.transform(Affine::translate(Vec2::new(5.0, 0.0)));
        assert_eq!(stack.depth(), 1);

        stack.restore();
        assert_eq!(*stack.current(), DrawState::default());
        assert_eq!(stack.depth(), 0);

        // Unbalanced restore is ignored
        stack.restore();
        assert_eq!(*stack.current(), DrawState::default());
    }

    #[test]
    fn alpha_is_clamped() {
        let mut stack = StateStack::new();
        stack.set_alpha(4.0);
        assert_eq!(stack.current().alpha, 1.0);
        stack.set_alpha(-1.0);
        assert_eq!(stack.current().alpha, 0.0);
        stack.set_alpha(f32::NAN);
        assert_eq!(stack.current().alpha, 1.0);
    }
}
