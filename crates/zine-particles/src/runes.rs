//! Rune glyphs: three shapes for each of the five genre families.
//!
//! Glyphs are drawn centred on the origin in the caller's transform, with
//! their own fixed translucent colours; the entity's opacity comes through
//! the surface's global alpha.

use kurbo::{BezPath, Circle, Ellipse, Rect, Shape};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;
use zine_core::{Color, ZineError};
use zine_render::{Paint, StrokeStyle, Surface};

/// Shapes per family
pub const RUNE_SHAPES: usize = 3;

const TOLERANCE: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuneFamily {
    /// Leaf, flower, tree
    Nature,
    /// Star, ringed planet, galaxy spiral
    Cosmos,
    /// Magic circle, arcane triangle, rune letter
    Fantasy,
    /// Pentagram, skull, dripping circle
    Horror,
    /// Wave, bubble group, fish
    Ocean,
}

impl RuneFamily {
    pub const ALL: [RuneFamily; 5] = [
        RuneFamily::Nature,
        RuneFamily::Cosmos,
        RuneFamily::Fantasy,
        RuneFamily::Horror,
        RuneFamily::Ocean,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RuneFamily::Nature => "nature",
            RuneFamily::Cosmos => "cosmos",
            RuneFamily::Fantasy => "fantasy",
            RuneFamily::Horror => "horror",
            RuneFamily::Ocean => "ocean",
        }
    }
}

impl fmt::Display for RuneFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RuneFamily {
    type Err = ZineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuneFamily::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s)
            .ok_or_else(|| ZineError::InvalidEnumValue {
                value: s.to_string(),
                allowed: RuneFamily::ALL.iter().map(|f| f.name().to_string()).collect(),
            })
    }
}

fn rgba(r: f32, g: f32, b: f32, a: f32) -> Paint {
    Paint::Solid(Color::from_rgba8(r, g, b, a))
}

fn circle(x: f64, y: f64, r: f64) -> BezPath {
    Circle::new((x, y), r.max(0.0)).to_path(TOLERANCE)
}

fn ellipse(x: f64, y: f64, rx: f64, ry: f64, rotation: f64) -> BezPath {
    Ellipse::new((x, y), (rx.max(0.0), ry.max(0.0)), rotation).to_path(TOLERANCE)
}

/// Star polygon with `spikes` points, outer radius `outer`, starting at the top
pub fn star_path(spikes: u32, outer: f64, inner: f64) -> BezPath {
    let spikes = spikes.max(2);
    let step = PI / spikes as f64;
    let mut rot = PI / 2.0 * 3.0;
    let mut path = BezPath::new();
    path.move_to((0.0, -outer));
    for _ in 0..spikes {
        path.line_to((rot.cos() * outer, rot.sin() * outer));
        rot += step;
        path.line_to((rot.cos() * inner, rot.sin() * inner));
        rot += step;
    }
    path.close_path();
    path
}

/// Draw glyph `index` (mod [`RUNE_SHAPES`]) of `family` at the origin
pub fn draw_rune(surface: &mut dyn Surface, family: RuneFamily, index: u8, size: f32) {
    let s = size as f64;
    let index = index as usize % RUNE_SHAPES;
    match family {
        RuneFamily::Nature => nature(surface, s, index),
        RuneFamily::Cosmos => cosmos(surface, s, index),
        RuneFamily::Fantasy => fantasy(surface, s, index),
        RuneFamily::Horror => horror(surface, s, index),
        RuneFamily::Ocean => ocean(surface, s, index),
    }
}

fn nature(surface: &mut dyn Surface, s: f64, index: usize) {
    match index {
        0 => {
            let mut leaf = BezPath::new();
            leaf.move_to((0.0, -s));
            leaf.quad_to((s, -s / 2.0), (0.0, s));
            leaf.quad_to((-s, -s / 2.0), (0.0, -s));
            leaf.close_path();
            surface.fill(&leaf, &rgba(118.0, 200.0, 147.0, 0.4));
        }
        1 => {
            let petal = rgba(252.0, 191.0, 73.0, 0.4);
            for i in 0..5 {
                let angle = i as f64 * TAU / 5.0;
                surface.fill(&ellipse(0.0, -s, s / 3.0, s / 2.0, angle), &petal);
            }
        }
        _ => {
            let trunk = Rect::new(-s / 8.0, 0.0, s / 8.0, s).to_path(TOLERANCE);
            surface.fill(&trunk, &rgba(121.0, 85.0, 72.0, 0.4));
            surface.fill(&circle(0.0, 0.0, s / 2.0), &rgba(76.0, 175.0, 80.0, 0.3));
        }
    }
}

fn cosmos(surface: &mut dyn Surface, s: f64, index: usize) {
    match index {
        0 => surface.fill(&star_path(5, s, s / 2.0), &rgba(72.0, 149.0, 239.0, 0.4)),
        1 => {
            surface.fill(&circle(0.0, 0.0, s / 2.0), &rgba(114.0, 9.0, 183.0, 0.3));
            surface.stroke(
                &ellipse(0.0, 0.0, s, s / 3.0, 0.0),
                &StrokeStyle::new(2.0),
                &rgba(247.0, 37.0, 133.0, 0.4),
            );
        }
        _ => {
            let mut spiral = BezPath::new();
            for i in 0..100 {
                let angle = 0.1 * i as f64;
                let radius = 2.0 * s * (i as f64 / 100.0);
                let p = (radius * angle.cos(), radius * angle.sin());
                if i == 0 {
                    spiral.move_to(p);
                } else {
                    spiral.line_to(p);
                }
            }
            surface.stroke(&spiral, &StrokeStyle::new(2.0), &rgba(76.0, 201.0, 240.0, 0.3));
        }
    }
}

fn fantasy(surface: &mut dyn Surface, s: f64, index: usize) {
    match index {
        0 => {
            let wide = StrokeStyle::new(2.0);
            surface.stroke(&circle(0.0, 0.0, s), &wide, &rgba(224.0, 170.0, 255.0, 0.4));
            surface.stroke(&circle(0.0, 0.0, s * 0.6), &wide, &rgba(157.0, 78.0, 221.0, 0.4));
            let mut cross = BezPath::new();
            cross.move_to((-s, 0.0));
            cross.line_to((s, 0.0));
            cross.move_to((0.0, -s));
            cross.line_to((0.0, s));
            surface.stroke(&cross, &wide, &rgba(199.0, 125.0, 255.0, 0.3));
        }
        1 => {
            let mut triangle = BezPath::new();
            triangle.move_to((0.0, -s));
            triangle.line_to((-s, s));
            triangle.line_to((s, s));
            triangle.close_path();
            surface.stroke(&triangle, &StrokeStyle::new(2.0), &rgba(255.0, 153.0, 200.0, 0.4));
            surface.fill(
                &ellipse(0.0, 0.0, s / 3.0, s / 4.0, 0.0),
                &rgba(157.0, 78.0, 221.0, 0.3),
            );
        }
        _ => {
            let mut letter = BezPath::new();
            letter.move_to((-s / 2.0, -s));
            letter.line_to((-s / 2.0, s));
            letter.move_to((-s / 2.0, -s / 2.0));
            letter.line_to((s / 2.0, -s / 2.0));
            letter.move_to((-s / 2.0, 0.0));
            letter.line_to((s / 3.0, 0.0));
            surface.stroke(&letter, &StrokeStyle::new(3.0), &rgba(252.0, 246.0, 189.0, 0.4));
        }
    }
}

fn horror(surface: &mut dyn Surface, s: f64, index: usize) {
    match index {
        0 => {
            let mut pentagram = BezPath::new();
            for i in 0..=10 {
                let angle = i as f64 * PI / 5.0;
                let radius = if i % 2 == 0 { s } else { s / 2.0 };
                let p = (radius * angle.sin(), -radius * angle.cos());
                if i == 0 {
                    pentagram.move_to(p);
                } else {
                    pentagram.line_to(p);
                }
            }
            pentagram.close_path();
            surface.stroke(&pentagram, &StrokeStyle::new(2.0), &rgba(164.0, 19.0, 60.0, 0.5));
        }
        1 => {
            surface.fill(&circle(0.0, 0.0, s / 2.0), &rgba(26.0, 26.0, 26.0, 0.4));
            let mut eyes = circle(-s / 5.0, -s / 8.0, s / 8.0);
            eyes.extend(Circle::new((s / 5.0, -s / 8.0), s / 8.0).path_elements(TOLERANCE));
            surface.fill(&eyes, &rgba(255.0, 89.0, 94.0, 0.5));
        }
        _ => {
            surface.fill(&circle(0.0, 0.0, s / 2.0), &rgba(128.0, 15.0, 47.0, 0.4));
            let mut drips = BezPath::new();
            drips.move_to((-s / 3.0, s / 2.0));
            drips.quad_to((-s / 3.0, s), (-s / 4.0, s));
            drips.move_to((0.0, s / 2.0));
            drips.quad_to((0.0, s * 1.2), (s / 6.0, s * 1.2));
            drips.move_to((s / 3.0, s / 2.0));
            drips.quad_to((s / 3.0, s * 0.8), (s / 2.0, s * 0.8));
            surface.stroke(&drips, &StrokeStyle::new(3.0), &rgba(164.0, 19.0, 60.0, 0.5));
        }
    }
}

fn ocean(surface: &mut dyn Surface, s: f64, index: usize) {
    match index {
        0 => {
            let mut wave = BezPath::new();
            wave.move_to((-s, 0.0));
            wave.quad_to((-s / 2.0, -s / 2.0), (0.0, 0.0));
            wave.quad_to((s / 2.0, s / 2.0), (s, 0.0));
            surface.stroke(&wave, &StrokeStyle::new(3.0), &rgba(0.0, 180.0, 216.0, 0.4));
        }
        1 => {
            let main = circle(0.0, 0.0, s / 2.0);
            surface.fill(&main, &rgba(144.0, 224.0, 239.0, 0.3));
            surface.stroke(&main, &StrokeStyle::new(1.0), &rgba(173.0, 232.0, 244.0, 0.5));
            let mut small = circle(s / 2.0, -s / 3.0, s / 4.0);
            small.extend(Circle::new((-s / 2.0, s / 3.0), s / 5.0).path_elements(TOLERANCE));
            small.extend(Circle::new((s / 4.0, s / 2.0), s / 6.0).path_elements(TOLERANCE));
            surface.fill(&small, &rgba(202.0, 240.0, 248.0, 0.3));
        }
        _ => {
            surface.fill(&ellipse(0.0, 0.0, s, s / 2.0, 0.0), &rgba(72.0, 202.0, 228.0, 0.3));
            let mut tail = BezPath::new();
            tail.move_to((s, 0.0));
            tail.line_to((s * 1.5, -s / 2.0));
            tail.line_to((s * 1.5, s / 2.0));
            tail.close_path();
            surface.fill(&tail, &rgba(0.0, 180.0, 216.0, 0.3));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zine_core::ViewportSize;
    use zine_render::{DrawCall, RecordingSurface};

    #[test]
    fn every_glyph_draws_something() {
        for family in RuneFamily::ALL {
            for index in 0..RUNE_SHAPES as u8 {
                let mut surface = RecordingSurface::new(ViewportSize::new(100.0, 100.0));
                draw_rune(&mut surface, family, index, 20.0);
                assert!(surface.draw_count() > 0, "{family} #{index} drew nothing");
                assert_eq!(surface.depth(), 0);
            }
        }
    }

    #[test]
    fn index_wraps_modulo_shape_count() {
        let mut a = RecordingSurface::new(ViewportSize::new(100.0, 100.0));
        let mut b = RecordingSurface::new(ViewportSize::new(100.0, 100.0));
        draw_rune(&mut a, RuneFamily::Horror, 1, 12.0);
        draw_rune(&mut b, RuneFamily::Horror, 4, 12.0);
        assert_eq!(a.calls(), b.calls());
    }

    #[test]
    fn star_path_spans_outer_radius() {
        let bbox = star_path(5, 10.0, 5.0).bounding_box();
        assert!((bbox.min_y() + 10.0).abs() < 1e-6);
        assert!(bbox.max_x() <= 10.0 + 1e-6);
    }

    #[test]
    fn family_parses_by_name() {
        assert_eq!("ocean".parse::<RuneFamily>().unwrap(), RuneFamily::Ocean);
        assert!("swamp".parse::<RuneFamily>().is_err());
        let mut surface = RecordingSurface::new(ViewportSize::new(10.0, 10.0));
        draw_rune(&mut surface, RuneFamily::Cosmos, 0, 4.0);
        assert!(matches!(surface.calls()[0], DrawCall::Fill { .. }));
    }
}
