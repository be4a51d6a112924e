//! CLI command implementations

pub mod render;
pub mod simulate;
pub mod themes;
pub mod validate;

use anyhow::{Context, Result};
use zine_core::ViewportSize;
use zine_particles::{ScopeConfig, ScopeHandle, Theme};
use zine_runtime::HeadlessPlatform;

/// Where a command's scope config comes from
pub struct ScopeSource {
    pub theme: Option<String>,
    pub config: Option<String>,
    pub width: u32,
    pub height: u32,
    pub seed: Option<u64>,
}

impl ScopeSource {
    pub fn size(&self) -> ViewportSize {
        ViewportSize::new(self.width as f32, self.height as f32)
    }

    /// Theme preset (or defaults), overridden by the config file, then the seed
    pub fn load(&self) -> Result<ScopeConfig> {
        let theme = self
            .theme
            .as_deref()
            .map(str::parse::<Theme>)
            .transpose()
            .context("Failed to parse --theme")?;
        let mut config = match (&self.config, theme) {
            (Some(path), theme) => {
                let source = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {path}"))?;
                ScopeConfig::from_toml_over(&source, theme)
                    .with_context(|| format!("Failed to parse config {path}"))?
            }
            (None, Some(theme)) => ScopeConfig::preset(theme),
            (None, None) => ScopeConfig::default(),
        };
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

/// Drive `scope` for `frames` frames: a pointer sweeping a lissajous curve
/// with a click every two seconds.
pub fn drive(host: &HeadlessPlatform, scope: &ScopeHandle, size: ViewportSize, frames: u32) {
    scope.start();
    for frame in 0..frames {
        let t = frame as f32 / 60.0;
        let x = size.width * (0.5 + 0.4 * (t * 1.3).sin());
        let y = size.height * (0.5 + 0.35 * (t * 2.1).cos());
        host.pointer_move(x, y);
        if frame % 120 == 60 {
            host.click(x, y);
        }
        host.advance_frames(1);
    }
}
