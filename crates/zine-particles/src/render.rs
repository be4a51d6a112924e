//! Render rule set: one shape strategy per [`ShapeKind`]

use crate::behavior::ShapeKind;
use crate::particle::{Entity, Style};
use crate::runes::{draw_rune, star_path};
use kurbo::{Affine, BezPath, Circle, Point, Shape, Vec2 as KVec2};
use zine_core::Color;
use zine_render::{GradientStop, NodeStyle, Paint, StrokeStyle, Surface};

/// Sizes below this are drawn at this size
pub const MIN_DRAW_SIZE: f32 = 0.5;

const TOLERANCE: f64 = 0.1;

const SMOKE_EDGE: Color = Color::new(30.0 / 255.0, 30.0 / 255.0, 30.0 / 255.0, 0.0);
const GLOW_EDGE: Color = Color::new(70.0 / 255.0, 0.0, 1.0, 0.0);
const GLOW_CORE: Color = Color::new(1.0, 1.0, 1.0, 0.8);
const BUBBLE_FILL: Color = Color::new(120.0 / 255.0, 220.0 / 255.0, 1.0, 0.3);
const BUBBLE_RIM: Color = Color::new(1.0, 1.0, 1.0, 0.8);
const BUBBLE_HIGHLIGHT: Color = Color::new(1.0, 1.0, 1.0, 0.7);

fn disc(center: Point, radius: f64) -> BezPath {
    Circle::new(center, radius).to_path(TOLERANCE)
}

/// Draw one entity in its own save/restore bracket.
///
/// Global alpha is set to the entity's opacity and the shape is drawn in a
/// local frame translated to the entity's position and rotated by its
/// rotation. Invisible or non-finite entities are skipped.
pub fn render_entity(entity: &Entity, surface: &mut dyn Surface) {
    let opacity = entity.style.opacity;
    if !(opacity > 0.0) || !entity.position.is_finite() {
        return;
    }
    let size = if entity.size.is_finite() {
        entity.size.max(MIN_DRAW_SIZE)
    } else {
        MIN_DRAW_SIZE
    };
    let rotation = if entity.style.rotation.is_finite() {
        entity.style.rotation as f64
    } else {
        0.0
    };

    surface.save();
    surface.set_global_alpha(opacity.min(1.0));
    let offset = KVec2::new(entity.position.x as f64, entity.position.y as f64);
    surface.transform(Affine::translate(offset) * Affine::rotate(rotation));
    draw_shape(surface, &entity.style, size as f64);
    surface.restore();
}

/// Draw a style's shape centred on the origin
pub fn draw_shape(surface: &mut dyn Surface, style: &Style, size: f64) {
    let origin = Point::ZERO;
    match style.shape {
        ShapeKind::Circle => surface.fill(&disc(origin, size), &Paint::Solid(style.color)),
        ShapeKind::Star {
            spikes,
            inner_ratio,
        } => {
            let path = star_path(spikes, size, size * inner_ratio.clamp(0.05, 1.0) as f64);
            surface.fill(&path, &Paint::Solid(style.color));
        }
        ShapeKind::Smoke => {
            let paint = Paint::radial(
                origin,
                size,
                vec![GradientStop::new(0.0, style.color), GradientStop::new(1.0, SMOKE_EDGE)],
            );
            surface.fill(&disc(origin, size), &paint);
        }
        ShapeKind::Glow => {
            let halo = size * 1.5;
            let paint = Paint::radial(
                origin,
                halo,
                vec![GradientStop::new(0.0, style.color), GradientStop::new(1.0, GLOW_EDGE)],
            );
            surface.fill(&disc(origin, halo), &paint);
            surface.fill(&disc(origin, size * 0.5), &Paint::Solid(GLOW_CORE));
        }
        ShapeKind::Bubble => {
            let body = disc(origin, size);
            surface.fill(&body, &Paint::Solid(BUBBLE_FILL));
            surface.stroke(&body, &StrokeStyle::new(1.0), &Paint::Solid(BUBBLE_RIM));
            let highlight = Point::new(-size * 0.3, -size * 0.3);
            surface.fill(&disc(highlight, size * 0.2), &Paint::Solid(BUBBLE_HIGHLIGHT));
        }
        ShapeKind::Rune { family, index } => draw_rune(surface, family, index, size as f32),
    }
}

/// Peak alpha of a connection line between two coincident entities
pub const CONNECT_ALPHA: f32 = 0.5;

/// Join every pair of live entities closer than `max_distance` with a
/// 1px line in the first entity's colour. Alpha falls linearly from
/// [`CONNECT_ALPHA`] at zero distance to nothing at `max_distance`.
/// Returns the number of lines drawn.
pub fn draw_connections(surface: &mut dyn Surface, entities: &[Entity], max_distance: f32) -> usize {
    if !(max_distance.is_finite() && max_distance > 0.0) {
        return 0;
    }
    let live: Vec<&Entity> = entities
        .iter()
        .filter(|e| !e.expired && e.position.is_finite())
        .collect();
    let style = StrokeStyle::new(1.0);
    let mut lines = 0;

    surface.save();
    for (i, a) in live.iter().enumerate() {
        for b in &live[i + 1..] {
            let distance = a.position.distance(b.position);
            if distance >= max_distance {
                continue;
            }
            let mut path = BezPath::new();
            path.move_to(Point::new(a.position.x as f64, a.position.y as f64));
            path.line_to(Point::new(b.position.x as f64, b.position.y as f64));
            surface.set_global_alpha((1.0 - distance / max_distance) * CONNECT_ALPHA);
            surface.stroke(&path, &style, &Paint::Solid(a.style.color.with_alpha(1.0)));
            lines += 1;
        }
    }
    surface.restore();
    lines
}

/// Inline style of an entity's overlay node
pub fn node_style(entity: &Entity) -> NodeStyle {
    let size = if entity.size.is_finite() {
        entity.size.max(MIN_DRAW_SIZE)
    } else {
        MIN_DRAW_SIZE
    };
    NodeStyle {
        class: entity.rules.dom_class,
        left: entity.position.x - size,
        top: entity.position.y - size,
        width: size * 2.0,
        height: size * 2.0,
        opacity: entity.style.opacity.clamp(0.0, 1.0),
        rotation_deg: entity.style.rotation.to_degrees(),
        color: entity.style.color,
    }
}
