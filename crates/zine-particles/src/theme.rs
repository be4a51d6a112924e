//! Built-in theme presets

use crate::behavior::BehaviorTag;
use crate::config::{BurstStyle, FadeMode, RuneConfig, ScopeConfig, TrailTint};
use crate::runes::RuneFamily;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zine_core::{Color, ZineError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Calm blue sparkle trail of the landing page
    Landing,
    Nature,
    Cosmos,
    Ocean,
    Fantasy,
    Horror,
}

impl Theme {
    pub const ALL: [Theme; 6] = [
        Theme::Landing,
        Theme::Nature,
        Theme::Cosmos,
        Theme::Ocean,
        Theme::Fantasy,
        Theme::Horror,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Theme::Landing => "landing",
            Theme::Nature => "nature",
            Theme::Cosmos => "cosmos",
            Theme::Ocean => "ocean",
            Theme::Fantasy => "fantasy",
            Theme::Horror => "horror",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Theme::Landing => "soft blue trail curve with cursor glow and click ripples",
            Theme::Nature => "floating leaves, green sparkles, leaf bursts",
            Theme::Cosmos => "twinkling star field with star bursts",
            Theme::Ocean => "rising bubbles and bubble bursts",
            Theme::Fantasy => "spiralling glow motes and cursor followers",
            Theme::Horror => "drifting smoke and smoke bursts",
        }
    }

    /// Burst colours of the five genres
    pub fn burst_palette(self) -> Vec<Color> {
        let hex: &[u32] = match self {
            Theme::Landing => &[0xbedcff, 0xb4d2fa, 0xd2e6ff, 0xdcebff, 0xffffff],
            Theme::Nature => &[0x76c893, 0x52b69a, 0x99d98c, 0xd9ed92, 0xfcbf49],
            Theme::Cosmos => &[0x4895ef, 0x4cc9f0, 0x7209b7, 0xf72585, 0xffffff],
            Theme::Fantasy => &[0x9d4edd, 0xc77dff, 0xe0aaff, 0xff99c8, 0xfcf6bd],
            Theme::Horror => &[0x590d22, 0x800f2f, 0xa4133c, 0xff595e, 0x1a1a1a],
            Theme::Ocean => &[0x00b4d8, 0x48cae4, 0x90e0ef, 0xade8f4, 0xcaf0f8],
        };
        hex.iter().map(|&h| Color::from_hex(h)).collect()
    }

    pub fn config(self) -> ScopeConfig {
        let base = ScopeConfig {
            theme: Some(self),
            color_palette: self.burst_palette(),
            ..ScopeConfig::default()
        };
        match self {
            Theme::Landing => ScopeConfig {
                max_ambient_entities: 0,
                behavior_palette: vec![BehaviorTag::TrailSparkle, BehaviorTag::ClickBurst],
                burst_count: 12,
                max_concurrent_bursts: 4,
                move_throttle_ms: 16.0,
                trail_particles_per_move: 1,
                fade: FadeMode::Translucent(Color::from_rgba8(5.0, 10.0, 20.0, 0.4)),
                trail_curve: true,
                cursor_glow: true,
                trail_tint: Some(TrailTint {
                    base: [170.0, 200.0, 255.0],
                    spread: [60.0, 40.0, 0.0],
                    alpha: 0.7,
                    size_scale: 1.0,
                    life_scale: 1.0,
                }),
                ..base
            },
            Theme::Nature => ScopeConfig {
                ambient_spawn_interval_ms: 600.0,
                max_ambient_entities: 25,
                behavior_palette: vec![
                    BehaviorTag::GenreLeaf,
                    BehaviorTag::AmbientDrift,
                    BehaviorTag::TrailSparkle,
                    BehaviorTag::ClickBurst,
                ],
                burst_count: 30,
                burst_style: BurstStyle::Leaf,
                trail_tint: Some(tint([118.0, 200.0, 73.0], [50.0, 55.0, 50.0], 0.8, 1.2, 1.2)),
                runes: Some(runes(RuneFamily::Nature)),
                ..base
            },
            Theme::Cosmos => ScopeConfig {
                ambient_spawn_interval_ms: 300.0,
                max_ambient_entities: 60,
                behavior_palette: vec![
                    BehaviorTag::GenreStar,
                    BehaviorTag::TrailSparkle,
                    BehaviorTag::ClickBurst,
                ],
                burst_count: 40,
                burst_style: BurstStyle::Star,
                initial_ambient: 20,
                initial_stagger_ms: 100.0,
                dom_node_lifetime_ms: Some(1_000.0),
                trail_tint: Some(tint([72.0, 149.0, 239.0], [50.0, 50.0, 16.0], 0.8, 0.8, 1.5)),
                runes: Some(runes(RuneFamily::Cosmos)),
                ..base
            },
            Theme::Ocean => ScopeConfig {
                ambient_spawn_interval_ms: 500.0,
                max_ambient_entities: 30,
                behavior_palette: vec![
                    BehaviorTag::GenreBubble,
                    BehaviorTag::TrailSparkle,
                    BehaviorTag::ClickBurst,
                ],
                burst_count: 20,
                burst_style: BurstStyle::Bubble,
                trail_tint: Some(tint([0.0, 180.0, 216.0], [72.0, 52.0, 32.0], 0.8, 1.1, 1.1)),
                runes: Some(runes(RuneFamily::Ocean)),
                ..base
            },
            Theme::Fantasy => ScopeConfig {
                ambient_spawn_interval_ms: 450.0,
                max_ambient_entities: 35,
                behavior_palette: vec![
                    BehaviorTag::GenreGlow,
                    BehaviorTag::CursorFollow,
                    BehaviorTag::ClickBurst,
                ],
                burst_count: 35,
                burst_style: BurstStyle::Glow,
                trail_tint: Some(tint([157.0, 78.0, 221.0], [50.0, 100.0, 34.0], 0.8, 1.0, 1.0)),
                runes: Some(runes(RuneFamily::Fantasy)),
                ..base
            },
            Theme::Horror => ScopeConfig {
                ambient_spawn_interval_ms: 700.0,
                max_ambient_entities: 20,
                behavior_palette: vec![
                    BehaviorTag::GenreSmoke,
                    BehaviorTag::TrailSparkle,
                    BehaviorTag::ClickBurst,
                ],
                burst_count: 25,
                burst_style: BurstStyle::Smoke,
                fade: FadeMode::Translucent(Color::from_rgba8(0.0, 0.0, 0.0, 0.15)),
                trail_tint: Some(tint([164.0, 19.0, 60.0], [50.0, 50.0, 30.0], 0.7, 1.5, 0.7)),
                runes: Some(runes(RuneFamily::Horror)),
                ..base
            },
        }
    }
}

fn tint(base: [f32; 3], spread: [f32; 3], alpha: f32, size_scale: f32, life_scale: f32) -> TrailTint {
    TrailTint {
        base,
        spread,
        alpha,
        size_scale,
        life_scale,
    }
}

fn runes(family: RuneFamily) -> RuneConfig {
    RuneConfig {
        chance: 0.1,
        family,
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Theme {
    type Err = ZineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Theme::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ZineError::InvalidEnumValue {
                value: s.to_string(),
                allowed: Theme::ALL.iter().map(|t| t.name().to_string()).collect(),
            })
    }
}
