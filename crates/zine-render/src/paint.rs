//! Fill and stroke styles

use kurbo::Point;
use zine_core::Color;

/// One colour stop of a gradient, `offset` in `[0, 1]`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Color,
}

impl GradientStop {
    pub const fn new(offset: f32, color: Color) -> Self {
        Self { offset, color }
    }
}

/// Radial gradient from `center` (offset 0) out to `radius` (offset 1)
#[derive(Clone, Debug, PartialEq)]
pub struct RadialGradient {
    pub center: Point,
    pub radius: f64,
    pub stops: Vec<GradientStop>,
}

/// Linear gradient from `start` (offset 0) to `end` (offset 1)
#[derive(Clone, Debug, PartialEq)]
pub struct LinearGradient {
    pub start: Point,
    pub end: Point,
    pub stops: Vec<GradientStop>,
}

/// What a fill or stroke is painted with. Gradient geometry is in the
/// same user space as the path it paints.
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    Solid(Color),
    Radial(RadialGradient),
    Linear(LinearGradient),
}

impl Paint {
    pub fn radial(center: Point, radius: f64, stops: Vec<GradientStop>) -> Self {
        Paint::Radial(RadialGradient {
            center,
            radius,
            stops,
        })
    }

    pub fn linear(start: Point, end: Point, stops: Vec<GradientStop>) -> Self {
        Paint::Linear(LinearGradient { start, end, stops })
    }
}

/// Stroke geometry. Lines are always drawn with round caps and joins.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    pub width: f64,
}

impl StrokeStyle {
    pub const fn new(width: f64) -> Self {
        Self { width }
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self { width: 1.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_keep_geometry_and_stops() {
        let stops = vec![
            GradientStop::new(0.0, Color::WHITE),
            GradientStop::new(1.0, Color::TRANSPARENT),
        ];
        let Paint::Radial(g) = Paint::radial(Point::new(3.0, 4.0), 5.0, stops.clone()) else {
            panic!("expected a radial paint");
        };
        assert_eq!((g.center, g.radius), (Point::new(3.0, 4.0), 5.0));
        assert_eq!(g.stops, stops);

        let Paint::Linear(g) = Paint::linear(Point::ZERO, Point::new(10.0, 0.0), stops) else {
            panic!("expected a linear paint");
        };
        assert_eq!(g.end.x, 10.0);
        assert_eq!(StrokeStyle::default(), StrokeStyle::new(1.0));
    }
}
