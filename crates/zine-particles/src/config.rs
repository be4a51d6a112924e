//! Scope configuration (parsed from TOML) and its documented ranges

use crate::behavior::{BehaviorTag, Motion, ShapeKind};
use crate::rand::ParticleRng;
use crate::runes::RuneFamily;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;
use zine_core::{BlendMode, Color, Result, ZineError};

/// How entities reach the screen. Selected per scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Draw calls on a shared surface
    #[default]
    Canvas,
    /// One styled overlay node per entity
    Dom,
}

/// What the loop paints over the previous frame (canvas scopes only)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FadeMode {
    /// Hard clear every frame
    Clear,
    /// Translucent fill, leaving motion trails
    Translucent(Color),
}

impl Default for FadeMode {
    fn default() -> Self {
        FadeMode::Translucent(Color::from_rgba8(0.0, 0.0, 0.0, 0.1))
    }
}

/// Look and genre motion of click-burst particles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BurstStyle {
    /// Plain circles that coast to a stop
    #[default]
    Ripple,
    Leaf,
    Star,
    Smoke,
    Glow,
    Bubble,
}

impl BurstStyle {
    pub fn shape(self) -> ShapeKind {
        match self {
            BurstStyle::Ripple | BurstStyle::Leaf => ShapeKind::Circle,
            BurstStyle::Star => ShapeKind::STAR,
            BurstStyle::Smoke => ShapeKind::Smoke,
            BurstStyle::Glow => ShapeKind::Glow,
            BurstStyle::Bubble => ShapeKind::Bubble,
        }
    }

    pub fn motion(self) -> Motion {
        match self {
            BurstStyle::Ripple => Motion::Still,
            BurstStyle::Leaf => Motion::LeafFloat,
            BurstStyle::Star => Motion::Twinkle,
            BurstStyle::Smoke => Motion::SmokeDrift,
            BurstStyle::Glow => Motion::Spiral,
            BurstStyle::Bubble => Motion::BubbleRise,
        }
    }
}

/// Randomised tint for pointer-triggered particles: each channel is
/// `base + [0, spread)` on the 0-255 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailTint {
    pub base: [f32; 3],
    pub spread: [f32; 3],
    pub alpha: f32,
    #[serde(default = "one")]
    pub size_scale: f32,
    #[serde(default = "one")]
    pub life_scale: f32,
}

fn one() -> f32 {
    1.0
}

impl TrailTint {
    pub fn sample(&self, rng: &mut ParticleRng) -> Color {
        let mut channel = |i: usize| self.base[i] + rng.range(0.0, self.spread[i].max(0.0));
        let (r, g, b) = (channel(0), channel(1), channel(2));
        Color::from_rgba8(r, g, b, self.alpha)
    }
}

/// Runes dropped at the pointer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuneConfig {
    /// Probability of one rune per frame while the pointer is known
    #[serde(default = "default_rune_chance")]
    pub chance: f32,
    pub family: RuneFamily,
}

fn default_rune_chance() -> f32 {
    0.1
}

pub const SPAWN_INTERVAL_RANGE: (f64, f64) = (10.0, 60_000.0);
pub const MAX_ENTITIES_RANGE: (usize, usize) = (0, 2_000);
pub const BURST_COUNT_RANGE: (u32, u32) = (1, 200);
pub const CONCURRENT_BURSTS_RANGE: (u32, u32) = (1, 20);
pub const THROTTLE_RANGE: (f64, f64) = (0.0, 1_000.0);
pub const PER_MOVE_RANGE: (u32, u32) = (0, 16);
pub const STAGGER_RANGE: (f64, f64) = (0.0, 10_000.0);
pub const NODE_LIFETIME_RANGE: (f64, f64) = (16.0, 60_000.0);
pub const CONNECT_DISTANCE_RANGE: (f64, f64) = (1.0, 1_000.0);

/// Configuration of one animation scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    /// Preset this configuration was derived from
    pub theme: Option<Theme>,
    /// Period of the ambient spawn timer
    pub ambient_spawn_interval_ms: f64,
    pub max_ambient_entities: usize,
    pub cursor_trail_enabled: bool,
    pub burst_on_click: bool,
    /// Tags eligible in this scope. Ambient spawns draw from its ambient
    /// tags; `cursor-follow` here switches trail spawns to followers.
    pub behavior_palette: Vec<BehaviorTag>,
    pub color_palette: Vec<Color>,
    /// Entities per click
    pub burst_count: u32,
    /// Bursts kept alive at once; older burst entities are evicted
    pub max_concurrent_bursts: u32,
    pub max_trail_entities: usize,
    /// Minimum interval between processed pointer moves
    pub move_throttle_ms: f64,
    /// Probability that a processed move spawns trail entities
    pub trail_spawn_chance: f32,
    pub trail_particles_per_move: u32,
    /// Only spawn trail entities while a button is held
    pub trail_requires_press: bool,
    /// Per-frame exponential ease of cursor followers
    pub ease_factor: f32,
    pub backend: Backend,
    pub fade: FadeMode,
    /// Blend mode of the translucent fade fill
    pub blend_mode: BlendMode,
    /// Join live entities closer than this many pixels with faint lines
    pub connect_distance: Option<f32>,
    /// Draw a smooth curve through recent pointer positions
    pub trail_curve: bool,
    pub cursor_glow: bool,
    pub runes: Option<RuneConfig>,
    /// Ambient entities spawned right after mount, one per stagger step
    pub initial_ambient: usize,
    pub initial_stagger_ms: f64,
    /// DOM particles remove their own node after this long
    pub dom_node_lifetime_ms: Option<f64>,
    pub trail_tint: Option<TrailTint>,
    pub burst_style: BurstStyle,
    /// Fixed RNG seed; random per scope when absent
    pub seed: Option<u64>,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            theme: None,
            ambient_spawn_interval_ms: 400.0,
            max_ambient_entities: 40,
            cursor_trail_enabled: true,
            burst_on_click: true,
            behavior_palette: vec![
                BehaviorTag::AmbientDrift,
                BehaviorTag::TrailSparkle,
                BehaviorTag::ClickBurst,
            ],
            color_palette: vec![Color::WHITE, Color::from_hex(0xdddddd), Color::from_hex(0xeeeeee)],
            burst_count: 30,
            max_concurrent_bursts: 3,
            max_trail_entities: 120,
            move_throttle_ms: 50.0,
            trail_spawn_chance: 0.7,
            trail_particles_per_move: 2,
            trail_requires_press: false,
            ease_factor: 0.05,
            backend: Backend::Canvas,
            fade: FadeMode::default(),
            blend_mode: BlendMode::Normal,
            connect_distance: None,
            trail_curve: false,
            cursor_glow: false,
            runes: None,
            initial_ambient: 0,
            initial_stagger_ms: 100.0,
            dom_node_lifetime_ms: None,
            trail_tint: None,
            burst_style: BurstStyle::Ripple,
            seed: None,
        }
    }
}

impl ScopeConfig {
    /// Built-in configuration for a theme
    pub fn preset(theme: Theme) -> Self {
        theme.config()
    }

    /// Parse a TOML document. When it names a `theme`, that preset is the
    /// base and every key present in the document overrides it.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Self::from_toml_over(source, None)
    }

    /// Like [`from_toml_str`](Self::from_toml_str), with `fallback` as the
    /// base preset for documents that don't name a theme
    pub fn from_toml_over(source: &str, fallback: Option<Theme>) -> Result<Self> {
        let table: toml::Table = toml::from_str(source)?;
        let theme = match table.get("theme") {
            Some(value) => {
                let name = value
                    .as_str()
                    .ok_or_else(|| ZineError::InvalidConfig("theme must be a string".into()))?;
                Some(name.parse()?)
            }
            None => fallback,
        };
        let Some(theme) = theme else {
            return Ok(toml::Value::Table(table).try_into()?);
        };

        let mut merged = match toml::Value::try_from(Self::preset(theme))? {
            toml::Value::Table(t) => t,
            _ => return Err(ZineError::InvalidConfig("preset did not serialize to a table".into())),
        };
        for (key, value) in table {
            merged.insert(key, value);
        }
        Ok(toml::Value::Table(merged).try_into()?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Every value outside its documented range
    pub fn violations(&self) -> Vec<ZineError> {
        let mut errors = Vec::new();
        let mut check = |field: &str, value: f64, (min, max): (f64, f64)| {
            if !(value.is_finite() && value >= min && value <= max) {
                errors.push(ZineError::ValueOutOfRange {
                    field: field.to_string(),
                    min,
                    max,
                    value,
                });
            }
        };
        let entities = (MAX_ENTITIES_RANGE.0 as f64, MAX_ENTITIES_RANGE.1 as f64);

        check("ambient_spawn_interval_ms", self.ambient_spawn_interval_ms, SPAWN_INTERVAL_RANGE);
        check("max_ambient_entities", self.max_ambient_entities as f64, entities);
        check("max_trail_entities", self.max_trail_entities as f64, entities);
        check(
            "burst_count",
            self.burst_count as f64,
            (BURST_COUNT_RANGE.0 as f64, BURST_COUNT_RANGE.1 as f64),
        );
        check(
            "max_concurrent_bursts",
            self.max_concurrent_bursts as f64,
            (CONCURRENT_BURSTS_RANGE.0 as f64, CONCURRENT_BURSTS_RANGE.1 as f64),
        );
        check("move_throttle_ms", self.move_throttle_ms, THROTTLE_RANGE);
        check("trail_spawn_chance", self.trail_spawn_chance as f64, (0.0, 1.0));
        check(
            "trail_particles_per_move",
            self.trail_particles_per_move as f64,
            (PER_MOVE_RANGE.0 as f64, PER_MOVE_RANGE.1 as f64),
        );
        check("ease_factor", self.ease_factor as f64, (0.0, 1.0));
        check(
            "initial_ambient",
            self.initial_ambient as f64,
            (0.0, self.max_ambient_entities as f64),
        );
        check("initial_stagger_ms", self.initial_stagger_ms, STAGGER_RANGE);
        if let Some(lifetime) = self.dom_node_lifetime_ms {
            check("dom_node_lifetime_ms", lifetime, NODE_LIFETIME_RANGE);
        }
        if let Some(distance) = self.connect_distance {
            check("connect_distance", distance as f64, CONNECT_DISTANCE_RANGE);
        }
        if let Some(runes) = &self.runes {
            check("runes.chance", runes.chance as f64, (0.0, 1.0));
        }
        if let Some(tint) = &self.trail_tint {
            check("trail_tint.alpha", tint.alpha as f64, (0.0, 1.0));
            check("trail_tint.size_scale", tint.size_scale as f64, (0.1, 10.0));
            check("trail_tint.life_scale", tint.life_scale as f64, (0.1, 10.0));
        }
        errors
    }

    /// First violation, if any
    pub fn validate(&self) -> Result<()> {
        match self.violations().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Copy with every field clamped into range
    pub fn sanitized(&self) -> Self {
        let mut c = self.clone();
        c.ambient_spawn_interval_ms =
            clamp_f64(c.ambient_spawn_interval_ms, SPAWN_INTERVAL_RANGE, 400.0);
        c.max_ambient_entities = c.max_ambient_entities.min(MAX_ENTITIES_RANGE.1);
        c.max_trail_entities = c.max_trail_entities.min(MAX_ENTITIES_RANGE.1);
        c.burst_count = c.burst_count.clamp(BURST_COUNT_RANGE.0, BURST_COUNT_RANGE.1);
        c.max_concurrent_bursts = c
            .max_concurrent_bursts
            .clamp(CONCURRENT_BURSTS_RANGE.0, CONCURRENT_BURSTS_RANGE.1);
        c.move_throttle_ms = clamp_f64(c.move_throttle_ms, THROTTLE_RANGE, 50.0);
        c.trail_spawn_chance = clamp_unit(c.trail_spawn_chance, 0.7);
        c.trail_particles_per_move = c.trail_particles_per_move.min(PER_MOVE_RANGE.1);
        c.ease_factor = clamp_unit(c.ease_factor, 0.05);
        c.initial_ambient = c.initial_ambient.min(c.max_ambient_entities);
        c.initial_stagger_ms = clamp_f64(c.initial_stagger_ms, STAGGER_RANGE, 100.0);
        c.dom_node_lifetime_ms = c
            .dom_node_lifetime_ms
            .map(|ms| clamp_f64(ms, NODE_LIFETIME_RANGE, 1_000.0));
        c.connect_distance = c.connect_distance.map(|d| {
            let range = (CONNECT_DISTANCE_RANGE.0 as f32, CONNECT_DISTANCE_RANGE.1 as f32);
            clamp_f32(d, range, 100.0)
        });
        if let Some(runes) = &mut c.runes {
            runes.chance = clamp_unit(runes.chance, 0.1);
        }
        if let Some(tint) = &mut c.trail_tint {
            tint.alpha = clamp_unit(tint.alpha, 0.8);
            tint.size_scale = clamp_f32(tint.size_scale, (0.1, 10.0), 1.0);
            tint.life_scale = clamp_f32(tint.life_scale, (0.1, 10.0), 1.0);
        }
        c
    }

    /// Population cap of burst entities across concurrent bursts
    pub fn max_burst_entities(&self) -> usize {
        self.burst_count as usize * self.max_concurrent_bursts as usize
    }

    /// Ambient-capable tags of the palette
    pub fn ambient_tags(&self) -> Vec<BehaviorTag> {
        self.behavior_palette
            .iter()
            .copied()
            .filter(|t| t.is_ambient())
            .collect()
    }

    /// Tag spawned by pointer movement
    pub fn trail_tag(&self) -> BehaviorTag {
        if self.behavior_palette.contains(&BehaviorTag::CursorFollow) {
            BehaviorTag::CursorFollow
        } else {
            BehaviorTag::TrailSparkle
        }
    }
}

fn clamp_f64(value: f64, (min, max): (f64, f64), fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

fn clamp_f32(value: f32, (min, max): (f32, f32), fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

fn clamp_unit(value: f32, fallback: f32) -> f32 {
    clamp_f32(value, (0.0, 1.0), fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ScopeConfig::default().violations().is_empty());
        for theme in Theme::ALL {
            let config = ScopeConfig::preset(theme);
            assert!(config.violations().is_empty(), "{theme} preset invalid");
        }
    }

    #[test]
    fn parse_plain_document() {
        let config = ScopeConfig::from_toml_str(
            r##"
            ambient_spawn_interval_ms = 250
            max_ambient_entities = 12
            burst_on_click = false
            behavior_palette = ["genre-bubble", "cursor-follow"]
            color_palette = ["#00b4d8", "rgba(72, 202, 228, 0.5)"]
            fade = "clear"
            backend = "dom"
            "##,
        )
        .unwrap();

        assert_eq!(config.ambient_spawn_interval_ms, 250.0);
        assert_eq!(config.max_ambient_entities, 12);
        assert!(!config.burst_on_click);
        assert_eq!(config.ambient_tags(), vec![BehaviorTag::GenreBubble]);
        assert_eq!(config.trail_tag(), BehaviorTag::CursorFollow);
        assert_eq!(config.color_palette.len(), 2);
        assert!((config.color_palette[1].a - 0.5).abs() < 1e-6);
        assert_eq!(config.fade, FadeMode::Clear);
        assert_eq!(config.backend, Backend::Dom);
        // Omitted keys keep their defaults
        assert_eq!(config.burst_count, 30);
    }

    #[test]
    fn theme_key_selects_preset_base() {
        let config = ScopeConfig::from_toml_str(
            r#"
            theme = "cosmos"
            burst_count = 8
            "#,
        )
        .unwrap();
        let cosmos = ScopeConfig::preset(Theme::Cosmos);
        assert_eq!(config.theme, Some(Theme::Cosmos));
        assert_eq!(config.burst_count, 8);
        assert_eq!(config.burst_style, cosmos.burst_style);
        assert_eq!(config.initial_ambient, cosmos.initial_ambient);
        assert_eq!(config.color_palette, cosmos.color_palette);
    }

    #[test]
    fn fallback_theme_applies_only_without_a_theme_key() {
        let over = ScopeConfig::from_toml_over("burst_count = 8", Some(Theme::Ocean)).unwrap();
        assert_eq!(over.theme, Some(Theme::Ocean));
        assert_eq!(over.burst_count, 8);
        assert_eq!(over.burst_style, BurstStyle::Bubble);

        let named = ScopeConfig::from_toml_over(r#"theme = "horror""#, Some(Theme::Ocean)).unwrap();
        assert_eq!(named.theme, Some(Theme::Horror));

        let plain = ScopeConfig::from_toml_over("burst_count = 8", None).unwrap();
        assert_eq!(plain.theme, None);
        assert_eq!(plain.burst_style, BurstStyle::Ripple);
    }

    #[test]
    fn blend_mode_and_connections_parse() {
        let config = ScopeConfig::from_toml_str(
            r#"
            blend_mode = "screen"
            connect_distance = 100
            "#,
        )
        .unwrap();
        assert_eq!(config.blend_mode, BlendMode::Screen);
        assert_eq!(config.connect_distance, Some(100.0));
        assert!(config.violations().is_empty());

        let plain = ScopeConfig::default();
        assert_eq!(plain.blend_mode, BlendMode::Normal);
        assert_eq!(plain.connect_distance, None);

        assert!(ScopeConfig::from_toml_str(r#"blend_mode = "lighten""#).is_err());

        let bad = ScopeConfig {
            connect_distance: Some(-5.0),
            ..ScopeConfig::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(ZineError::ValueOutOfRange { ref field, .. }) if field == "connect_distance"
        ));
        assert_eq!(bad.sanitized().connect_distance, Some(1.0));
    }

    #[test]
    fn translucent_fade_parses_from_table() {
        let config =
            ScopeConfig::from_toml_str(r#"fade = { translucent = "rgba(5, 10, 20, 0.4)" }"#).unwrap();
        match config.fade {
            FadeMode::Translucent(c) => assert!((c.a - 0.4).abs() < 1e-6),
            other => panic!("unexpected fade {other:?}"),
        }
    }

    #[test]
    fn unknown_tag_and_theme_are_rejected() {
        assert!(matches!(
            ScopeConfig::from_toml_str(r#"behavior_palette = ["glitter"]"#),
            Err(ZineError::ConfigParse(_))
        ));
        assert!(matches!(
            ScopeConfig::from_toml_str(r#"theme = "vaporwave""#),
            Err(ZineError::InvalidEnumValue { .. })
        ));
    }

    #[test]
    fn violations_name_every_bad_field() {
        let config = ScopeConfig {
            burst_count: 0,
            ease_factor: 2.0,
            move_throttle_ms: f64::NAN,
            ..ScopeConfig::default()
        };
        let fields: Vec<String> = config
            .violations()
            .into_iter()
            .filter_map(|e| match e {
                ZineError::ValueOutOfRange { field, .. } => Some(field),
                _ => None,
            })
            .collect();
        assert_eq!(fields, vec!["burst_count", "move_throttle_ms", "ease_factor"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn sanitized_config_is_valid() {
        let config = ScopeConfig {
            ambient_spawn_interval_ms: -5.0,
            max_ambient_entities: 10,
            initial_ambient: 50,
            trail_spawn_chance: f32::INFINITY,
            burst_count: 10_000,
            dom_node_lifetime_ms: Some(1.0),
            ..ScopeConfig::default()
        };
        let clean = config.sanitized();
        assert!(clean.violations().is_empty());
        assert_eq!(clean.ambient_spawn_interval_ms, SPAWN_INTERVAL_RANGE.0);
        assert_eq!(clean.initial_ambient, 10);
        assert_eq!(clean.burst_count, BURST_COUNT_RANGE.1);
        assert_eq!(clean.trail_spawn_chance, 0.7);
    }

    #[test]
    fn preset_round_trips_through_toml() {
        let landing = ScopeConfig::preset(Theme::Landing);
        let text = landing.to_toml_string().unwrap();
        let parsed = ScopeConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed.fade, landing.fade);
        assert_eq!(parsed.burst_count, landing.burst_count);
        assert_eq!(parsed.trail_curve, landing.trail_curve);
    }
}
