//! Behaviour tags and the update rule set
//!
//! Each tag maps to one [`BehaviorRules`] entry in a static table. The
//! factory resolves the entry once at spawn and stores the reference on the
//! entity, so the per-frame pass calls straight through a function pointer.

use crate::curves::{damp, ease_over, fade_in_out};
use crate::particle::Entity;
use crate::runes::RuneFamily;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zine_core::{ViewportSize, ZineError};

/// Selects the update and render strategy of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BehaviorTag {
    AmbientDrift,
    CursorFollow,
    ClickBurst,
    TrailSparkle,
    GenreLeaf,
    GenreStar,
    GenreBubble,
    GenreSmoke,
    GenreGlow,
    GenreRune,
}

impl BehaviorTag {
    pub const ALL: [BehaviorTag; 10] = [
        BehaviorTag::AmbientDrift,
        BehaviorTag::CursorFollow,
        BehaviorTag::ClickBurst,
        BehaviorTag::TrailSparkle,
        BehaviorTag::GenreLeaf,
        BehaviorTag::GenreStar,
        BehaviorTag::GenreBubble,
        BehaviorTag::GenreSmoke,
        BehaviorTag::GenreGlow,
        BehaviorTag::GenreRune,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BehaviorTag::AmbientDrift => "ambient-drift",
            BehaviorTag::CursorFollow => "cursor-follow",
            BehaviorTag::ClickBurst => "click-burst",
            BehaviorTag::TrailSparkle => "trail-sparkle",
            BehaviorTag::GenreLeaf => "genre-leaf",
            BehaviorTag::GenreStar => "genre-star",
            BehaviorTag::GenreBubble => "genre-bubble",
            BehaviorTag::GenreSmoke => "genre-smoke",
            BehaviorTag::GenreGlow => "genre-glow",
            BehaviorTag::GenreRune => "genre-rune",
        }
    }

    /// Which population cap an entity with this tag counts against
    pub fn spawn_kind(self) -> SpawnKind {
        match self {
            BehaviorTag::ClickBurst => SpawnKind::Burst,
            BehaviorTag::CursorFollow | BehaviorTag::TrailSparkle | BehaviorTag::GenreRune => {
                SpawnKind::Trail
            }
            _ => SpawnKind::Ambient,
        }
    }

    /// Tags the ambient timer may spawn
    pub fn is_ambient(self) -> bool {
        self.spawn_kind() == SpawnKind::Ambient
    }

    pub fn rules(self) -> &'static BehaviorRules {
        &RULES[self as usize]
    }
}

impl fmt::Display for BehaviorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BehaviorTag {
    type Err = ZineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BehaviorTag::ALL
            .iter()
            .copied()
            .find(|tag| tag.name() == s)
            .ok_or_else(|| ZineError::InvalidEnumValue {
                value: s.to_string(),
                allowed: BehaviorTag::ALL.iter().map(|t| t.name().to_string()).collect(),
            })
    }
}

/// What triggered a spawn; each kind has its own population cap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpawnKind {
    Ambient,
    Trail,
    Burst,
}

impl SpawnKind {
    pub const ALL: [SpawnKind; 3] = [SpawnKind::Ambient, SpawnKind::Trail, SpawnKind::Burst];

    pub(crate) fn slot(self) -> usize {
        self as usize
    }
}

/// Shape strategy used by the canvas render rules
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeKind {
    Circle,
    Star { spikes: u32, inner_ratio: f32 },
    Smoke,
    Glow,
    Bubble,
    Rune { family: RuneFamily, index: u8 },
}

impl ShapeKind {
    pub const STAR: ShapeKind = ShapeKind::Star {
        spikes: 5,
        inner_ratio: 0.5,
    };
}

/// Genre flavour layered over a tag's base motion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Motion {
    #[default]
    Still,
    /// Gentle upward float with a sideways wobble
    LeafFloat,
    /// Size pulses slightly around its slowly shrinking base
    Twinkle,
    /// Grows and thins out
    SmokeDrift,
    /// Velocity rotates along a slow spiral
    Spiral,
    /// Accelerates upward with a sway
    BubbleRise,
}

/// Per-frame inputs shared by every entity update
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    /// Elapsed reference frames since the previous frame
    pub dt: f32,
    pub pointer: Option<Vec2>,
    pub bounds: ViewportSize,
    pub ease_factor: f32,
}

impl FrameContext {
    pub fn new(dt: f32, pointer: Option<Vec2>, bounds: ViewportSize, ease_factor: f32) -> Self {
        Self {
            dt,
            pointer,
            bounds,
            ease_factor,
        }
    }
}

/// Strategy entry for one tag
pub struct BehaviorRules {
    pub tag: BehaviorTag,
    pub shape: ShapeKind,
    pub motion: Motion,
    /// CSS class for DOM-backed scopes
    pub dom_class: &'static str,
    pub step: fn(&mut Entity, &FrameContext),
}

impl fmt::Debug for BehaviorRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorRules")
            .field("tag", &self.tag)
            .field("shape", &self.shape)
            .field("motion", &self.motion)
            .field("dom_class", &self.dom_class)
            .finish_non_exhaustive()
    }
}

static RULES: [BehaviorRules; 10] = [
    BehaviorRules {
        tag: BehaviorTag::AmbientDrift,
        shape: ShapeKind::Circle,
        motion: Motion::Still,
        dom_class: "zine-ambient",
        step: step_ambient_drift,
    },
    BehaviorRules {
        tag: BehaviorTag::CursorFollow,
        shape: ShapeKind::Glow,
        motion: Motion::Still,
        dom_class: "zine-follow",
        step: step_cursor_follow,
    },
    BehaviorRules {
        tag: BehaviorTag::ClickBurst,
        shape: ShapeKind::Circle,
        motion: Motion::Still,
        dom_class: "zine-burst",
        step: step_click_burst,
    },
    BehaviorRules {
        tag: BehaviorTag::TrailSparkle,
        shape: ShapeKind::Circle,
        motion: Motion::Still,
        dom_class: "zine-sparkle",
        step: step_trail_sparkle,
    },
    BehaviorRules {
        tag: BehaviorTag::GenreLeaf,
        shape: ShapeKind::Rune {
            family: RuneFamily::Nature,
            index: 0,
        },
        motion: Motion::LeafFloat,
        dom_class: "zine-leaf",
        step: step_genre_ambient,
    },
    BehaviorRules {
        tag: BehaviorTag::GenreStar,
        shape: ShapeKind::STAR,
        motion: Motion::Still,
        dom_class: "zine-star",
        step: step_genre_star,
    },
    BehaviorRules {
        tag: BehaviorTag::GenreBubble,
        shape: ShapeKind::Bubble,
        motion: Motion::BubbleRise,
        dom_class: "zine-bubble",
        step: step_genre_ambient,
    },
    BehaviorRules {
        tag: BehaviorTag::GenreSmoke,
        shape: ShapeKind::Smoke,
        motion: Motion::SmokeDrift,
        dom_class: "zine-smoke",
        step: step_genre_ambient,
    },
    BehaviorRules {
        tag: BehaviorTag::GenreGlow,
        shape: ShapeKind::Glow,
        motion: Motion::Spiral,
        dom_class: "zine-glow",
        step: step_genre_ambient,
    },
    BehaviorRules {
        tag: BehaviorTag::GenreRune,
        shape: ShapeKind::Rune {
            family: RuneFamily::Fantasy,
            index: 0,
        },
        motion: Motion::Still,
        dom_class: "zine-rune",
        step: step_genre_rune,
    },
];

const SWAY_FREQUENCY: f32 = 0.05;
const SWAY_AMPLITUDE: f32 = 0.4;
const BURST_DAMPING: f32 = 0.97;
const SPARKLE_DAMPING: f32 = 0.98;
const RUNE_FADE_PER_FRAME: f32 = 0.01;
const AMBIENT_FADE_IN: f32 = 0.15;
const AMBIENT_FADE_OUT: f32 = 0.25;

/// Advance one entity by one frame.
///
/// Ages the entity, applies its tag's rule, then marks it expired once
/// `age >= max_age` or its opacity has reached zero. Expired entities are
/// left untouched.
pub fn update(entity: &mut Entity, ctx: &FrameContext) {
    if entity.expired {
        return;
    }
    entity.age += ctx.dt;
    (entity.rules.step)(entity, ctx);
    entity.rotation_step(ctx.dt);

    let opacity = &mut entity.style.opacity;
    *opacity = if opacity.is_finite() {
        opacity.clamp(0.0, 1.0)
    } else {
        0.0
    };
    if entity.age >= entity.max_age || entity.style.opacity <= 0.0 {
        entity.expired = true;
    }
}

fn integrate(entity: &mut Entity, dt: f32) {
    entity.position += entity.velocity * dt;
}

/// Genre nudges, per reference frame
fn apply_motion(entity: &mut Entity, dt: f32) {
    let life = entity.max_age - entity.age;
    match entity.motion {
        Motion::Still => {}
        Motion::LeafFloat => {
            entity.velocity.y -= 0.01 * dt;
            entity.velocity.x += (life * 0.1).sin() * 0.02 * dt;
        }
        Motion::Twinkle => {
            entity.size *= (0.995 + (life * 0.2).sin() * 0.01).powf(dt);
        }
        Motion::SmokeDrift => {
            entity.size *= damp(1.01, dt);
            entity.style.opacity *= damp(0.98, dt);
        }
        Motion::Spiral => {
            let angle = life * 0.05;
            entity.velocity += Vec2::new(angle.cos(), angle.sin()) * 0.01 * dt;
        }
        Motion::BubbleRise => {
            entity.velocity.y -= 0.03 * dt;
            entity.velocity.x += (life * 0.08).sin() * 0.03 * dt;
        }
    }
}

fn step_ambient_drift(entity: &mut Entity, ctx: &FrameContext) {
    let sway = (entity.phase + entity.age * SWAY_FREQUENCY).sin() * SWAY_AMPLITUDE;
    entity.position.x += (entity.velocity.x + sway) * ctx.dt;
    entity.position.y += entity.velocity.y * ctx.dt;
    entity.style.opacity = entity.style.base_opacity
        * fade_in_out(entity.life_ratio(), AMBIENT_FADE_IN, AMBIENT_FADE_OUT);
}

fn step_cursor_follow(entity: &mut Entity, ctx: &FrameContext) {
    if let Some(pointer) = ctx.pointer.filter(|p| p.is_finite()) {
        let k = ease_over(ctx.ease_factor, ctx.dt);
        let bounds = ctx.bounds.sanitized();
        let half = Vec2::new(bounds.width, bounds.height) * 0.5;
        let step = ((pointer - entity.position) * k).clamp(-half, half);
        entity.position += step;
    }
    entity.style.opacity = entity.style.base_opacity * fade_in_out(entity.life_ratio(), 0.0, 0.3);
}

fn step_click_burst(entity: &mut Entity, ctx: &FrameContext) {
    integrate(entity, ctx.dt);
    entity.velocity *= damp(BURST_DAMPING, ctx.dt);
    entity.style.opacity = entity.style.base_opacity * entity.remaining_ratio();
    apply_motion(entity, ctx.dt);
}

fn step_trail_sparkle(entity: &mut Entity, ctx: &FrameContext) {
    integrate(entity, ctx.dt);
    entity.velocity *= damp(SPARKLE_DAMPING, ctx.dt);
    entity.style.opacity = entity.style.base_opacity * entity.remaining_ratio();
    apply_motion(entity, ctx.dt);
}

fn step_genre_ambient(entity: &mut Entity, ctx: &FrameContext) {
    integrate(entity, ctx.dt);
    entity.style.opacity = entity.style.base_opacity
        * fade_in_out(entity.life_ratio(), AMBIENT_FADE_IN, AMBIENT_FADE_OUT);
    apply_motion(entity, ctx.dt);
}

fn step_genre_star(entity: &mut Entity, ctx: &FrameContext) {
    integrate(entity, ctx.dt);
    let twinkle = 0.7 + 0.3 * (entity.phase + entity.age * 0.1).sin();
    entity.style.opacity = entity.style.base_opacity
        * twinkle
        * fade_in_out(entity.life_ratio(), AMBIENT_FADE_IN, AMBIENT_FADE_OUT);
}

fn step_genre_rune(entity: &mut Entity, ctx: &FrameContext) {
    entity.style.opacity -= RUNE_FADE_PER_FRAME * ctx.dt;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::EntityFactory;
    use crate::rand::ParticleRng;
    use zine_core::Color;

    const BOUNDS: ViewportSize = ViewportSize::new(1280.0, 720.0);

    fn ctx(pointer: Option<Vec2>) -> FrameContext {
        FrameContext::new(1.0, pointer, BOUNDS, 0.05)
    }

    fn factory() -> EntityFactory {
        EntityFactory::new(vec![Color::WHITE])
    }

    #[test]
    fn tag_names_round_trip_through_from_str() {
        for tag in BehaviorTag::ALL {
            assert_eq!(tag.name().parse::<BehaviorTag>().unwrap(), tag);
            assert_eq!(tag.rules().tag, tag);
        }
        assert!(matches!(
            "sparkle".parse::<BehaviorTag>(),
            Err(ZineError::InvalidEnumValue { .. })
        ));
    }

    #[test]
    fn cursor_follow_eases_toward_pointer() {
        let mut rng = ParticleRng::new(1);
        let mut e = factory().spawn(&mut rng, Vec2::ZERO, BehaviorTag::CursorFollow, BOUNDS);
        assert_eq!(e.position, Vec2::ZERO);

        update(&mut e, &ctx(Some(Vec2::new(1000.0, 0.0))));
        assert!((e.position.x - 50.0).abs() < 1e-3, "x = {}", e.position.x);
        assert_eq!(e.position.y, 0.0);
    }

    #[test]
    fn cursor_follow_step_is_clamped_to_half_viewport() {
        let mut rng = ParticleRng::new(1);
        let small = ViewportSize::new(100.0, 80.0);
        let mut e = factory().spawn(&mut rng, Vec2::ZERO, BehaviorTag::CursorFollow, small);
        let jump = FrameContext::new(1.0, Some(Vec2::new(1.0e6, -1.0e6)), small, 1.0);
        update(&mut e, &jump);
        assert!(e.position.x <= 50.0 + 1e-3);
        assert!(e.position.y >= -40.0 - 1e-3);
    }

    #[test]
    fn every_tag_expires_in_bounded_steps() {
        let mut rng = ParticleRng::new(99);
        let f = factory();
        for tag in BehaviorTag::ALL {
            for _ in 0..20 {
                let mut e = f.spawn(&mut rng, Vec2::new(640.0, 360.0), tag, BOUNDS);
                let bound = e.max_age.ceil() as usize + 1;
                let mut steps = 0;
                while !e.expired {
                    update(&mut e, &ctx(Some(Vec2::new(10.0, 10.0))));
                    steps += 1;
                    assert!(steps <= bound, "{tag} outlived max_age");
                }
            }
        }
    }

    #[test]
    fn rune_fades_out_before_nominal_max_age() {
        let mut rng = ParticleRng::new(3);
        let mut e = factory().spawn(&mut rng, Vec2::new(5.0, 5.0), BehaviorTag::GenreRune, BOUNDS);
        let mut steps = 0;
        while !e.expired {
            update(&mut e, &ctx(None));
            steps += 1;
        }
        assert!((steps as f32) < e.max_age);
        assert!(e.style.opacity <= 0.0);
    }

    #[test]
    fn ambient_drift_sways_and_moves_vertically() {
        let mut rng = ParticleRng::new(11);
        let mut e = factory().spawn(&mut rng, Vec2::new(300.0, 300.0), BehaviorTag::AmbientDrift, BOUNDS);
        let start = e.position;
        let mut xs = Vec::new();
        for _ in 0..120 {
            update(&mut e, &ctx(None));
            xs.push(e.position.x - start.x - e.velocity.x * e.age);
        }
        assert!(e.position.y < start.y);
        let min = xs.iter().cloned().fold(f32::MAX, f32::min);
        let max = xs.iter().cloned().fold(f32::MIN, f32::max);
        assert!(max - min > 1.0, "no sway");
    }

    #[test]
    fn expired_entities_are_not_advanced() {
        let mut rng = ParticleRng::new(4);
        let mut e = factory().spawn(&mut rng, Vec2::ZERO, BehaviorTag::TrailSparkle, BOUNDS);
        e.expired = true;
        let before = e.age;
        update(&mut e, &ctx(None));
        assert_eq!(e.age, before);
    }
}
