//! Entity factory: randomized construction from per-tag ranges

use crate::behavior::{BehaviorTag, ShapeKind, SpawnKind};
use crate::config::{BurstStyle, ScopeConfig, TrailTint};
use crate::particle::{Entity, Style};
use crate::rand::ParticleRng;
use crate::runes::{RuneFamily, RUNE_SHAPES};
use glam::Vec2;
use zine_core::{Color, ViewportSize};

/// How an entity's initial velocity is drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Launch {
    /// Zero velocity
    Still,
    /// Independent uniform ranges per axis
    Drift { vx: (f32, f32), vy: (f32, f32) },
    /// Random direction, uniform speed
    Radial { speed: (f32, f32) },
}

/// Uniform ranges for every randomized parameter of one tag.
/// Sizes are pixels, lifetimes and rates are per reference frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRanges {
    pub size: (f32, f32),
    pub life: (f32, f32),
    pub launch: Launch,
    /// Origin scatter radius
    pub jitter: f32,
    pub spin: (f32, f32),
    pub opacity: f32,
}

impl SpawnRanges {
    pub fn for_tag(tag: BehaviorTag) -> SpawnRanges {
        match tag {
            BehaviorTag::AmbientDrift => SpawnRanges {
                size: (1.5, 4.0),
                life: (240.0, 480.0),
                launch: Launch::Drift {
                    vx: (-0.1, 0.1),
                    vy: (-0.8, -0.3),
                },
                jitter: 0.0,
                spin: (0.0, 0.0),
                opacity: 0.6,
            },
            BehaviorTag::CursorFollow => SpawnRanges {
                size: (2.0, 5.0),
                life: (40.0, 60.0),
                launch: Launch::Still,
                jitter: 0.0,
                spin: (0.0, 0.0),
                opacity: 0.8,
            },
            BehaviorTag::ClickBurst => SpawnRanges {
                size: (1.0, 4.0),
                life: (40.0, 80.0),
                launch: Launch::Radial { speed: (1.0, 3.0) },
                jitter: 3.0,
                spin: (-0.05, 0.05),
                opacity: 0.8,
            },
            BehaviorTag::TrailSparkle => SpawnRanges {
                size: (0.5, 2.5),
                life: (10.0, 30.0),
                launch: Launch::Drift {
                    vx: (-0.15, 0.15),
                    vy: (-0.15, 0.15),
                },
                jitter: 4.0,
                spin: (0.0, 0.0),
                opacity: 0.7,
            },
            BehaviorTag::GenreLeaf => SpawnRanges {
                size: (6.0, 12.0),
                life: (300.0, 500.0),
                launch: Launch::Drift {
                    vx: (-0.3, 0.3),
                    vy: (0.3, 0.8),
                },
                jitter: 0.0,
                spin: (-0.02, 0.02),
                opacity: 0.8,
            },
            BehaviorTag::GenreStar => SpawnRanges {
                size: (1.0, 3.0),
                life: (200.0, 400.0),
                launch: Launch::Drift {
                    vx: (-0.05, 0.05),
                    vy: (-0.05, 0.05),
                },
                jitter: 0.0,
                spin: (0.0, 0.0),
                opacity: 0.9,
            },
            BehaviorTag::GenreBubble => SpawnRanges {
                size: (4.0, 12.0),
                life: (200.0, 360.0),
                launch: Launch::Drift {
                    vx: (-0.2, 0.2),
                    vy: (-0.6, -0.2),
                },
                jitter: 0.0,
                spin: (0.0, 0.0),
                opacity: 0.7,
            },
            BehaviorTag::GenreSmoke => SpawnRanges {
                size: (8.0, 16.0),
                life: (120.0, 220.0),
                launch: Launch::Drift {
                    vx: (-0.2, 0.2),
                    vy: (-0.5, -0.2),
                },
                jitter: 0.0,
                spin: (0.0, 0.0),
                opacity: 0.5,
            },
            BehaviorTag::GenreGlow => SpawnRanges {
                size: (2.0, 5.0),
                life: (180.0, 300.0),
                launch: Launch::Drift {
                    vx: (-0.3, 0.3),
                    vy: (-0.3, 0.3),
                },
                jitter: 0.0,
                spin: (0.0, 0.0),
                opacity: 0.8,
            },
            // Fades at 0.01 per frame, so opacity runs out at frame 80
            BehaviorTag::GenreRune => SpawnRanges {
                size: (10.0, 30.0),
                life: (120.0, 120.0),
                launch: Launch::Still,
                jitter: 0.0,
                spin: (0.0, 0.0),
                opacity: 0.8,
            },
        }
    }
}

/// Builds entities for one scope's theme
#[derive(Debug, Clone)]
pub struct EntityFactory {
    palette: Vec<Color>,
    burst_style: BurstStyle,
    rune_family: RuneFamily,
    tint: Option<TrailTint>,
}

impl EntityFactory {
    pub fn new(palette: Vec<Color>) -> Self {
        Self {
            palette,
            burst_style: BurstStyle::Ripple,
            rune_family: RuneFamily::Fantasy,
            tint: None,
        }
    }

    pub fn from_config(config: &ScopeConfig) -> Self {
        Self {
            palette: config.color_palette.clone(),
            burst_style: config.burst_style,
            rune_family: config
                .runes
                .as_ref()
                .map(|r| r.family)
                .unwrap_or(RuneFamily::Fantasy),
            tint: config.trail_tint,
        }
    }

    pub fn with_burst_style(mut self, style: BurstStyle) -> Self {
        self.burst_style = style;
        self
    }

    pub fn with_rune_family(mut self, family: RuneFamily) -> Self {
        self.rune_family = family;
        self
    }

    pub fn with_tint(mut self, tint: TrailTint) -> Self {
        self.tint = Some(tint);
        self
    }

    /// Build one entity at `origin`. Never fails: non-finite coordinates
    /// become 0, the origin is clamped into `bounds`, and degenerate bounds
    /// are widened to 1×1.
    pub fn spawn(
        &self,
        rng: &mut ParticleRng,
        origin: Vec2,
        tag: BehaviorTag,
        bounds: ViewportSize,
    ) -> Entity {
        let bounds = bounds.sanitized();
        let ranges = SpawnRanges::for_tag(tag);
        let rules = tag.rules();
        let kind = tag.spawn_kind();

        let tint = self
            .tint
            .filter(|_| matches!(tag, BehaviorTag::TrailSparkle | BehaviorTag::CursorFollow));
        let (size_scale, life_scale) = tint.map_or((1.0, 1.0), |t| (t.size_scale, t.life_scale));

        let origin = clamp_origin(origin, bounds);
        let position = clamp_origin(origin + rng.in_disc(ranges.jitter), bounds);
        let velocity = match ranges.launch {
            Launch::Still => Vec2::ZERO,
            Launch::Drift { vx, vy } => Vec2::new(rng.range(vx.0, vx.1), rng.range(vy.0, vy.1)),
            Launch::Radial { speed } => rng.unit_circle() * rng.range(speed.0, speed.1),
        };

        let color = match tint {
            Some(t) => t.sample(rng),
            None => self.palette_color(rng),
        };

        let (shape, motion, variant) = match tag {
            BehaviorTag::ClickBurst => (self.burst_style.shape(), self.burst_style.motion(), 0),
            BehaviorTag::GenreRune => {
                let index = rng.index(RUNE_SHAPES) as u8;
                let shape = ShapeKind::Rune {
                    family: self.rune_family,
                    index,
                };
                (shape, rules.motion, index)
            }
            _ => (rules.shape, rules.motion, 0),
        };

        let rotation = if kind == SpawnKind::Burst || tag == BehaviorTag::GenreRune {
            rng.angle()
        } else {
            0.0
        };

        Entity {
            id: 0,
            kind,
            tag,
            position,
            velocity,
            size: rng.range(ranges.size.0, ranges.size.1) * size_scale,
            style: Style {
                color,
                opacity: ranges.opacity,
                base_opacity: ranges.opacity,
                rotation,
                spin: rng.range(ranges.spin.0, ranges.spin.1),
                shape,
                variant,
            },
            motion,
            age: 0.0,
            max_age: (rng.range(ranges.life.0, ranges.life.1) * life_scale).max(1.0),
            phase: rng.angle(),
            expired: false,
            node: None,
            rules,
        }
    }

    fn palette_color(&self, rng: &mut ParticleRng) -> Color {
        rng.pick(&self.palette).copied().unwrap_or(Color::WHITE)
    }
}

fn clamp_origin(origin: Vec2, bounds: ViewportSize) -> Vec2 {
    let finite = |v: f32| if v.is_finite() { v } else { 0.0 };
    Vec2::new(
        finite(origin.x).clamp(0.0, bounds.width),
        finite(origin.y).clamp(0.0, bounds.height),
    )
}
