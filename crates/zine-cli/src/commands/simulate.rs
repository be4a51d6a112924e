//! Headless simulation command

use super::{drive, ScopeSource};
use anyhow::{Context, Result};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::info;
use zine_particles::{create_animation_scope, RenderTarget};
use zine_render::{HeadlessDom, RecordingSurface};
use zine_runtime::HeadlessPlatform;

pub struct SimulateArgs {
    pub source: ScopeSource,
    pub frames: u32,
    pub dom: bool,
}

pub fn run(args: SimulateArgs) -> Result<()> {
    let config = args.source.load()?;
    let size = args.source.size();
    let host = HeadlessPlatform::new();

    // Keep the target alive for the whole run; the scope only borrows it
    let surface = Rc::new(RefCell::new(RecordingSurface::new(size)));
    let layer = Rc::new(HeadlessDom::new(size));
    let target = if args.dom {
        RenderTarget::dom(&layer)
    } else {
        RenderTarget::canvas(&surface)
    };

    let scope = create_animation_scope(Some(target), &host.platform(), config);
    drive(&host, &scope, size, args.frames);
    let stats = scope.stats();
    scope.dispose();
    info!(frames = stats.frames, live = stats.live, "simulation finished");

    let json = serde_json::to_string_pretty(&stats).context("Failed to serialize stats")?;
    println!("{json}");
    Ok(())
}
