//! Theme listing command

use anyhow::{Context, Result};
use zine_particles::{ScopeConfig, Theme};

pub fn run(show: Option<&str>) -> Result<()> {
    if let Some(name) = show {
        let theme: Theme = name.parse().context("Failed to parse theme name")?;
        let toml = ScopeConfig::preset(theme)
            .to_toml_string()
            .context("Failed to serialize preset")?;
        print!("{toml}");
        return Ok(());
    }

    println!("Themes:");
    for theme in Theme::ALL {
        let config = theme.config();
        println!(
            "  {:<8} {} (ambient {} every {}ms, burst {} x{}, style {:?})",
            theme.name(),
            theme.description(),
            config.max_ambient_entities,
            config.ambient_spawn_interval_ms,
            config.burst_count,
            config.max_concurrent_bursts,
            config.burst_style,
        );
    }
    Ok(())
}
