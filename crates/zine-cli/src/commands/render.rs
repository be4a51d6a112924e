//! Headless scope-to-PNG render command

use super::{drive, ScopeSource};
use anyhow::{bail, Context, Result};
use std::cell::RefCell;
use std::rc::Rc;
use zine_core::Color;
use zine_particles::{create_animation_scope, RenderTarget};
use zine_render::{RasterSurface, MAX_RASTER_DIMENSION};
use zine_runtime::HeadlessPlatform;

pub struct RenderArgs {
    pub source: ScopeSource,
    pub output: String,
    pub frames: u32,
}

pub fn run(args: RenderArgs) -> Result<()> {
    let raster = raster_for(&args.source)?;
    let config = args.source.load()?;
    let size = args.source.size();
    let host = HeadlessPlatform::new();
    let surface = Rc::new(RefCell::new(raster.with_background(Color::BLACK)));

    let scope = create_animation_scope(Some(RenderTarget::canvas(&surface)), &host.platform(), config);
    drive(&host, &scope, size, args.frames);
    let stats = scope.stats();
    scope.dispose();

    surface
        .borrow_mut()
        .save_png(&args.output)
        .with_context(|| format!("Failed to write {}", args.output))?;
    println!(
        "Rendered {} frame(s), {} live entities -> {}",
        stats.frames, stats.live, args.output
    );
    Ok(())
}

/// Raster surface for the requested viewport; each side must be between
/// 1 and [`MAX_RASTER_DIMENSION`] pixels
fn raster_for(source: &ScopeSource) -> Result<RasterSurface> {
    let (width, height) = (source.width, source.height);
    if width == 0 || height == 0 {
        bail!("Render size {width}x{height} must be at least 1x1");
    }
    RasterSurface::new(width, height)
        .with_context(|| format!("Render size {width}x{height} is not supported"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(width: u32, height: u32) -> ScopeSource {
        ScopeSource {
            theme: None,
            config: None,
            width,
            height,
            seed: None,
        }
    }

    #[test]
    fn oversized_render_sizes_are_refused() {
        let err = raster_for(&source(70_000, 70_000)).err();
        let message = format!("{:#}", err.expect("70000x70000 should be refused"));
        assert!(message.contains("70000x70000"), "{message}");
        assert!(raster_for(&source(MAX_RASTER_DIMENSION + 1, 10)).is_err());
        assert!(raster_for(&source(0, 10)).is_err());
    }

    #[test]
    fn ordinary_render_sizes_are_accepted() {
        let raster = raster_for(&source(640, 360)).unwrap();
        assert_eq!((raster.width(), raster.height()), (640, 360));
    }
}
