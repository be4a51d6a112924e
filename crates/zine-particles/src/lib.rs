//! Zine Particles - Decorative particle engine
//!
//! Provides self-contained animation scopes with:
//! - Spawn-ordered entity storage with per-kind population caps
//! - Behaviour rules resolved once per entity at spawn
//! - Canvas and overlay-node render backends selected per scope
//! - Throttled pointer trails, click bursts and timer-driven ambient spawns
//! - Genre themes with rune glyphs, trail curves and cursor glow

pub mod animator;
pub mod backend;
pub mod behavior;
pub mod bridge;
pub mod config;
pub mod curves;
pub mod factory;
pub mod particle;
pub mod rand;
pub mod render;
pub mod runes;
pub mod scope;
pub mod theme;
pub mod trail;

pub use animator::{run_frame, AnimationLoop, FrameDriver, FrameOutcome, FramePass, FrameReport, StopHandle};
pub use backend::{DomBackend, RenderBackend, RenderTarget};
pub use behavior::{update, BehaviorRules, BehaviorTag, FrameContext, Motion, ShapeKind, SpawnKind};
pub use bridge::{InputBridge, ListenerSet, SpawnRequest};
pub use config::{Backend, BurstStyle, FadeMode, RuneConfig, ScopeConfig, TrailTint};
pub use factory::{EntityFactory, SpawnRanges};
pub use particle::{Admission, Caps, Entity, EntityStore, Style};
pub use rand::ParticleRng;
pub use render::{node_style, render_entity};
pub use runes::RuneFamily;
pub use scope::{create_animation_scope, ScopeHandle, ScopeSlot, ScopeStats};
pub use theme::Theme;
pub use trail::TrailRing;
