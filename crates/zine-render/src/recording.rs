//! Draw-call recording surface

use crate::paint::{Paint, StrokeStyle};
use crate::surface::{StateStack, Surface};
use kurbo::{Affine, BezPath, Rect, Shape};
use zine_core::{BlendMode, Color, ViewportSize};

/// Which kind of paint a recorded call used
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PaintKind {
    Solid(Color),
    Radial,
    Linear,
}

impl From<&Paint> for PaintKind {
    fn from(paint: &Paint) -> Self {
        match paint {
            Paint::Solid(c) => PaintKind::Solid(*c),
            Paint::Radial(_) => PaintKind::Radial,
            Paint::Linear(_) => PaintKind::Linear,
        }
    }
}

/// One recorded surface operation. Geometry is in device space.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    Save,
    Restore,
    SetAlpha(f32),
    SetBlend(BlendMode),
    Transform(Affine),
    Clear,
    Fill {
        bounds: Rect,
        paint: PaintKind,
        alpha: f32,
        blend: BlendMode,
    },
    Stroke {
        bounds: Rect,
        width: f64,
        paint: PaintKind,
        alpha: f32,
        blend: BlendMode,
    },
}

/// A surface that draws nothing and remembers everything
pub struct RecordingSurface {
    size: ViewportSize,
    attached: bool,
    state: StateStack,
    calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new(size: ViewportSize) -> Self {
        Self {
            size,
            attached: true,
            state: StateStack::new(),
            calls: Vec::new(),
        }
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.calls)
    }

    /// Number of fill and stroke calls recorded
    pub fn draw_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Fill { .. } | DrawCall::Stroke { .. }))
            .count()
    }

    /// Current save-stack depth; zero when every save was restored
    pub fn depth(&self) -> usize {
        self.state.depth()
    }

    pub fn resize(&mut self, size: ViewportSize) {
        self.size = size;
    }

    /// Simulate the host removing the surface
    pub fn detach(&mut self) {
        self.attached = false;
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> ViewportSize {
        self.size
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn save(&mut self) {
        self.state.save();
        self.calls.push(DrawCall::Save);
    }

    fn restore(&mut self) {
        self.state.restore();
        self.calls.push(DrawCall::Restore);
    }

    fn global_alpha(&self) -> f32 {
        self.state.current().alpha
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.state.set_alpha(alpha);
        self.calls.push(DrawCall::SetAlpha(self.state.current().alpha));
    }

    fn blend_mode(&self) -> BlendMode {
        self.state.current().blend
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.state.set_blend(mode);
        self.calls.push(DrawCall::SetBlend(mode));
    }

    fn transform(&mut self, affine: Affine) {
        self.state.transform(affine);
        self.calls.push(DrawCall::Transform(affine));
    }

    fn clear(&mut self) {
        self.calls.push(DrawCall::Clear);
    }

    fn fill(&mut self, path: &BezPath, paint: &Paint) {
        let current = self.state.current();
        let bounds = (current.transform * path.clone()).bounding_box();
        self.calls.push(DrawCall::Fill {
            bounds,
            paint: paint.into(),
            alpha: current.alpha,
            blend: current.blend,
        });
    }

    fn stroke(&mut self, path: &BezPath, style: &StrokeStyle, paint: &Paint) {
        let current = self.state.current();
        let bounds = (current.transform * path.clone()).bounding_box();
        self.calls.push(DrawCall::Stroke {
            bounds,
            width: style.width,
            paint: paint.into(),
            alpha: current.alpha,
            blend: current.blend,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Circle, Point, Vec2};

    #[test]
    fn records_device_space_bounds() {
        let mut surface = RecordingSurface::new(ViewportSize::new(100.0, 100.0));
        surface.save();
        surface.transform(Affine::translate(Vec2::new(10.0, 20.0)));
        surface.fill(
            &Circle::new(Point::ZERO, 5.0).to_path(0.1),
            &Paint::Solid(Color::WHITE),
        );
        surface.restore();

        let fill = surface
            .calls()
            .iter()
            .find_map(|c| match c {
                DrawCall::Fill { bounds, .. } => Some(*bounds),
                _ => None,
            })
            .unwrap();
        assert!((fill.center().x - 10.0).abs() < 0.01);
        assert!((fill.center().y - 20.0).abs() < 0.01);
        assert_eq!(surface.depth(), 0);
        assert_eq!(surface.draw_count(), 1);
    }

    #[test]
    fn alpha_is_recorded_and_restored() {
        let mut surface = RecordingSurface::new(ViewportSize::new(10.0, 10.0));
        surface.save();
        surface.set_global_alpha(0.3);
        assert!((surface.global_alpha() - 0.3).abs() < 1e-6);
        surface.restore();
        assert_eq!(surface.global_alpha(), 1.0);
    }

    #[test]
    fn draws_carry_the_blend_mode_in_effect() {
        let mut surface = RecordingSurface::new(ViewportSize::new(10.0, 10.0));
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        surface.save();
        surface.set_blend_mode(BlendMode::Multiply);
        surface.fill_rect(rect, &Paint::Solid(Color::BLACK));
        surface.restore();
        surface.fill_rect(rect, &Paint::Solid(Color::BLACK));

        let blends: Vec<BlendMode> = surface
            .calls()
            .iter()
            .filter_map(|c| match c {
                DrawCall::Fill { blend, .. } => Some(*blend),
                _ => None,
            })
            .collect();
        assert_eq!(blends, vec![BlendMode::Multiply, BlendMode::Normal]);
        assert!(surface.calls().contains(&DrawCall::SetBlend(BlendMode::Multiply)));
    }

    #[test]
    fn detach_flips_attachment() {
        let mut surface = RecordingSurface::new(ViewportSize::new(10.0, 10.0));
        assert!(surface.is_attached());
        surface.detach();
        assert!(!surface.is_attached());
    }
}
