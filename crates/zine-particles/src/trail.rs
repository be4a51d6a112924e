//! Pointer trail ring and cursor glow

use glam::Vec2;
use kurbo::{BezPath, Circle, Point, Shape};
use std::collections::VecDeque;
use zine_core::Color;
use zine_render::{GradientStop, Paint, StrokeStyle, Surface};

pub const TRAIL_MAX_POINTS: usize = 20;
/// Reference frames a trail point stays on the curve
pub const TRAIL_POINT_MAX_AGE: f32 = 20.0;

const GLOW_RADIUS: f64 = 12.0;
const CORE_RADIUS: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub position: Vec2,
    pub age: f32,
    pub max_age: f32,
}

impl TrailPoint {
    pub fn opacity(&self) -> f32 {
        (1.0 - self.age / self.max_age).max(0.0)
    }
}

fn point(v: Vec2) -> Point {
    Point::new(v.x as f64, v.y as f64)
}

/// Bounded ring of recent pointer positions, oldest first
#[derive(Debug, Clone)]
pub struct TrailRing {
    points: VecDeque<TrailPoint>,
    capacity: usize,
}

impl Default for TrailRing {
    fn default() -> Self {
        Self::new(TRAIL_MAX_POINTS)
    }
}

impl TrailRing {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a point, evicting the oldest beyond capacity
    pub fn push(&mut self, position: Vec2) {
        if !position.is_finite() {
            return;
        }
        self.points.push_back(TrailPoint {
            position,
            age: 0.0,
            max_age: TRAIL_POINT_MAX_AGE,
        });
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    /// Age every point and drop the ones past their max age
    pub fn tick(&mut self, dt: f32) {
        for p in &mut self.points {
            p.age += dt;
        }
        self.points.retain(|p| p.age <= p.max_age);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = &TrailPoint> {
        self.points.iter()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Smooth curve through the ring: quadratic segments through the
    /// midpoints of consecutive points, ending on the newest point.
    /// `None` with fewer than two points.
    pub fn curve(&self) -> Option<BezPath> {
        if self.points.len() < 2 {
            return None;
        }
        let mut path = BezPath::new();
        let first = self.points.front()?;
        path.move_to(point(first.position));
        for (a, b) in self.points.iter().zip(self.points.iter().skip(1)) {
            let mid = (a.position + b.position) * 0.5;
            path.quad_to(point(a.position), point(mid));
        }
        let last = self.points.back()?;
        path.line_to(point(last.position));
        Some(path)
    }

    /// Glow pass, gradient stroke, then a thin bright core
    pub fn draw(&self, surface: &mut dyn Surface) {
        let (Some(curve), Some(first), Some(last)) =
            (self.curve(), self.points.front(), self.points.back())
        else {
            return;
        };
        surface.stroke(
            &curve,
            &StrokeStyle::new(10.0),
            &Paint::Solid(Color::from_rgba8(200.0, 220.0, 255.0, 0.15)),
        );
        let gradient = Paint::linear(
            point(first.position),
            point(last.position),
            vec![
                GradientStop::new(0.0, Color::from_rgba8(180.0, 210.0, 255.0, 0.0)),
                GradientStop::new(0.5, Color::from_rgba8(200.0, 225.0, 255.0, 0.3)),
                GradientStop::new(1.0, Color::from_rgba8(220.0, 235.0, 255.0, 0.6)),
            ],
        );
        surface.stroke(&curve, &StrokeStyle::new(4.0), &gradient);
        surface.stroke(
            &curve,
            &StrokeStyle::new(2.0),
            &Paint::Solid(Color::from_rgba8(220.0, 235.0, 255.0, 0.5)),
        );
    }
}

/// Soft radial glow with a bright core at the pointer
pub fn draw_cursor_glow(surface: &mut dyn Surface, pointer: Vec2) {
    if !pointer.is_finite() {
        return;
    }
    let center = point(pointer);
    surface.save();
    surface.set_global_alpha(0.7);
    let glow = Paint::radial(
        center,
        GLOW_RADIUS,
        vec![
            GradientStop::new(0.0, Color::from_rgba8(220.0, 235.0, 255.0, 0.8)),
            GradientStop::new(0.5, Color::from_rgba8(200.0, 225.0, 255.0, 0.4)),
            GradientStop::new(1.0, Color::from_rgba8(180.0, 210.0, 255.0, 0.0)),
        ],
    );
    surface.fill(&Circle::new(center, GLOW_RADIUS).to_path(0.1), &glow);
    surface.set_global_alpha(0.9);
    surface.fill(
        &Circle::new(center, CORE_RADIUS).to_path(0.1),
        &Paint::Solid(Color::from_rgba8(230.0, 240.0, 255.0, 0.9)),
    );
    surface.restore();
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::PathEl;
    use zine_core::ViewportSize;
    use zine_render::{DrawCall, PaintKind, RecordingSurface};

    #[test]
    fn ring_is_bounded() {
        let mut ring = TrailRing::default();
        for i in 0..500 {
            ring.push(Vec2::new(i as f32, 0.0));
        }
        assert_eq!(ring.len(), TRAIL_MAX_POINTS);
        assert_eq!(ring.points().next().unwrap().position.x, 480.0);
    }

    #[test]
    fn points_age_out() {
        let mut ring = TrailRing::default();
        ring.push(Vec2::ZERO);
        ring.tick(10.0);
        ring.push(Vec2::ONE);
        assert!((ring.points().next().unwrap().opacity() - 0.5).abs() < 1e-6);
        ring.tick(11.0);
        assert_eq!(ring.len(), 1);
        ring.tick(10.0);
        assert!(ring.is_empty());
    }

    #[test]
    fn curve_uses_midpoint_quads() {
        let mut ring = TrailRing::default();
        assert!(ring.curve().is_none());
        ring.push(Vec2::new(0.0, 0.0));
        ring.push(Vec2::new(10.0, 0.0));
        ring.push(Vec2::new(10.0, 10.0));
        let curve = ring.curve().unwrap();
        let quads: Vec<Point> = curve
            .elements()
            .iter()
            .filter_map(|el| match el {
                PathEl::QuadTo(_, end) => Some(*end),
                _ => None,
            })
            .collect();
        assert_eq!(quads, vec![Point::new(5.0, 0.0), Point::new(10.0, 5.0)]);
        assert!(matches!(curve.elements().last(), Some(PathEl::LineTo(p)) if *p == Point::new(10.0, 10.0)));
    }

    #[test]
    fn draw_strokes_with_gradient() {
        let mut ring = TrailRing::default();
        ring.push(Vec2::new(1.0, 1.0));
        ring.push(Vec2::new(30.0, 12.0));
        let mut surface = RecordingSurface::new(ViewportSize::new(64.0, 64.0));
        ring.draw(&mut surface);
        let strokes: Vec<PaintKind> = surface
            .calls()
            .iter()
            .filter_map(|c| match c {
                DrawCall::Stroke { paint, .. } => Some(*paint),
                _ => None,
            })
            .collect();
        assert_eq!(strokes.len(), 3);
        assert_eq!(strokes[1], PaintKind::Linear);
    }

    #[test]
    fn cursor_glow_is_bracketed() {
        let mut surface = RecordingSurface::new(ViewportSize::new(64.0, 64.0));
        draw_cursor_glow(&mut surface, Vec2::new(32.0, 32.0));
        assert_eq!(surface.draw_count(), 2);
        assert_eq!(surface.depth(), 0);
        assert_eq!(surface.global_alpha(), 1.0);
    }
}
