//! CPU rasteriser backing the headless render command

use crate::paint::{GradientStop, Paint, StrokeStyle};
use crate::surface::{StateStack, Surface};
use kurbo::{Affine, BezPath, PathEl, Rect, Shape};
use std::path::Path;
use vello_cpu::peniko::{self, Compose, Mix};
use vello_cpu::{Pixmap, RenderContext};
use zine_core::{BlendMode, Color, Result, ViewportSize, ZineError};

/// Largest width or height a raster surface accepts
pub const MAX_RASTER_DIMENSION: u32 = u16::MAX as u32;

/// Software canvas drawn through a `vello_cpu` render context.
///
/// Draw calls queue on the context until the pixels are read; `clear`
/// discards the queue.
pub struct RasterSurface {
    width: u16,
    height: u16,
    ctx: RenderContext,
    pixmap: Pixmap,
    pending: bool,
    background: Color,
    state: StateStack,
    attached: bool,
}

impl RasterSurface {
    /// Zero dimensions are bumped to one pixel
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let too_large = || ZineError::SurfaceTooLarge {
            width,
            height,
            max: MAX_RASTER_DIMENSION,
        };
        let w: u16 = width.max(1).try_into().map_err(|_| too_large())?;
        let h: u16 = height.max(1).try_into().map_err(|_| too_large())?;
        Ok(Self {
            width: w,
            height: h,
            ctx: RenderContext::new(w, h),
            pixmap: Pixmap::new(w, h),
            pending: false,
            background: Color::BLACK,
            state: StateStack::new(),
            attached: true,
        })
    }

    /// Colour the exported image is composited onto
    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn width(&self) -> u32 {
        u32::from(self.width)
    }

    pub fn height(&self) -> u32 {
        u32::from(self.height)
    }

    /// Rasterise queued draws into the pixel buffer
    pub fn flush(&mut self) {
        if !self.pending {
            return;
        }
        self.pixmap.data_as_u8_slice_mut().fill(0);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
        self.pending = false;
    }

    /// Un-premultiplied pixel at `(x, y)`, before background compositing
    pub fn pixel(&mut self, x: u32, y: u32) -> Color {
        if x >= self.width() || y >= self.height() {
            return Color::TRANSPARENT;
        }
        self.flush();
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = &self.pixmap.data_as_u8_slice()[i..i + 4];
        unpremultiply([px[0], px[1], px[2], px[3]].map(|c| c as f32 / 255.0))
    }

    pub fn detach(&mut self) {
        self.attached = false;
    }

    /// Flatten the surface over its background into an 8-bit image
    pub fn to_image(&mut self) -> image::RgbaImage {
        self.flush();
        let bg = self.background;
        let under = [bg.r * bg.a, bg.g * bg.a, bg.b * bg.a, bg.a];
        let mut data = Vec::with_capacity(self.pixmap.data_as_u8_slice().len());
        for px in self.pixmap.data_as_u8_slice().chunks_exact(4) {
            let src = [px[0], px[1], px[2], px[3]].map(|c| c as f32 / 255.0);
            let inv = 1.0 - src[3];
            let out = unpremultiply([
                src[0] + under[0] * inv,
                src[1] + under[1] * inv,
                src[2] + under[2] * inv,
                src[3] + under[3] * inv,
            ]);
            data.extend_from_slice(&out.to_rgba8());
        }
        image::RgbaImage::from_raw(self.width(), self.height(), data)
            .unwrap_or_else(|| image::RgbaImage::new(self.width(), self.height()))
    }

    pub fn save_png(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.to_image()
            .save(path.as_ref())
            .map_err(|e| ZineError::ImageError(e.to_string()))
    }

    /// Queue one draw with the current state. `draw` does the actual
    /// fill or stroke once paint, transform and layers are set.
    fn draw(&mut self, bounds: Rect, paint: &Paint, draw: impl FnOnce(&mut RenderContext)) {
        if !rect_is_finite(bounds) {
            return;
        }
        let state = *self.state.current();
        if state.alpha <= 0.0 {
            return;
        }
        let ctx = &mut self.ctx;
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(affine_to_cpu(state.transform));
        if !set_paint(ctx, paint) {
            return;
        }

        let blended = state.blend != BlendMode::Normal;
        if blended {
            ctx.push_blend_layer(blend_to_cpu(state.blend));
        }
        if state.alpha < 1.0 {
            ctx.push_opacity_layer(state.alpha);
        }
        draw(ctx);
        if state.alpha < 1.0 {
            ctx.pop_layer();
        }
        if blended {
            ctx.pop_layer();
        }
        self.pending = true;
    }
}

impl Surface for RasterSurface {
    fn size(&self) -> ViewportSize {
        ViewportSize::new(self.width as f32, self.height as f32)
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn save(&mut self) {
        self.state.save();
    }

    fn restore(&mut self) {
        self.state.restore();
    }

    fn global_alpha(&self) -> f32 {
        self.state.current().alpha
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.state.set_alpha(alpha);
    }

    fn blend_mode(&self) -> BlendMode {
        self.state.current().blend
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.state.set_blend(mode);
    }

    fn transform(&mut self, affine: Affine) {
        self.state.transform(affine);
    }

    fn clear(&mut self) {
        self.ctx.reset();
        self.pixmap.data_as_u8_slice_mut().fill(0);
        self.pending = false;
    }

    fn fill(&mut self, path: &BezPath, paint: &Paint) {
        let cpu_path = bezpath_to_cpu(path);
        self.draw(path.bounding_box(), paint, |ctx| ctx.fill_path(&cpu_path));
    }

    fn stroke(&mut self, path: &BezPath, style: &StrokeStyle, paint: &Paint) {
        if !(style.width.is_finite() && style.width > 0.0) {
            return;
        }
        let cpu_path = bezpath_to_cpu(path);
        let stroke = vello_cpu::kurbo::Stroke::new(style.width)
            .with_caps(vello_cpu::kurbo::Cap::Round)
            .with_join(vello_cpu::kurbo::Join::Round);
        self.draw(path.bounding_box(), paint, |ctx| {
            ctx.set_stroke(stroke);
            ctx.stroke_path(&cpu_path);
        });
    }

    fn fill_rect(&mut self, rect: Rect, paint: &Paint) {
        let cpu_rect = vello_cpu::kurbo::Rect::new(rect.x0, rect.y0, rect.x1, rect.y1);
        self.draw(rect, paint, |ctx| ctx.fill_rect(&cpu_rect));
    }
}

/// Set `paint` on the context; false when it would paint nothing
fn set_paint(ctx: &mut RenderContext, paint: &Paint) -> bool {
    match paint {
        Paint::Solid(c) => {
            ctx.set_paint(color_to_cpu(*c));
            true
        }
        Paint::Radial(g) => {
            if !(g.radius.is_finite() && g.radius > 0.0) {
                return false;
            }
            match g.stops.as_slice() {
                [] => false,
                [only] => {
                    ctx.set_paint(color_to_cpu(only.color));
                    true
                }
                stops => {
                    let stops = stops_to_cpu(stops);
                    ctx.set_paint(
                        peniko::Gradient::new_radial(
                            (g.center.x, g.center.y),
                            g.radius as f32,
                        )
                        .with_stops(stops.as_slice()),
                    );
                    true
                }
            }
        }
        Paint::Linear(g) => {
            if (g.end - g.start).hypot2() <= f64::EPSILON {
                return false;
            }
            match g.stops.as_slice() {
                [] => false,
                [only] => {
                    ctx.set_paint(color_to_cpu(only.color));
                    true
                }
                stops => {
                    let stops = stops_to_cpu(stops);
                    ctx.set_paint(
                        peniko::Gradient::new_linear((g.start.x, g.start.y), (g.end.x, g.end.y))
                            .with_stops(stops.as_slice()),
                    );
                    true
                }
            }
        }
    }
}

fn color_to_cpu(c: Color) -> peniko::Color {
    peniko::Color::new([c.r, c.g, c.b, c.a])
}

fn stops_to_cpu(stops: &[GradientStop]) -> Vec<peniko::ColorStop> {
    stops
        .iter()
        .map(|s| peniko::ColorStop::from((s.offset.clamp(0.0, 1.0), color_to_cpu(s.color))))
        .collect()
}

fn blend_to_cpu(mode: BlendMode) -> peniko::BlendMode {
    let mix = match mode {
        BlendMode::Normal => Mix::Normal,
        BlendMode::Screen => Mix::Screen,
        BlendMode::Multiply => Mix::Multiply,
        BlendMode::Overlay => Mix::Overlay,
    };
    peniko::BlendMode::new(mix, Compose::SrcOver)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: kurbo::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn rect_is_finite(r: Rect) -> bool {
    r.x0.is_finite() && r.y0.is_finite() && r.x1.is_finite() && r.y1.is_finite()
}

fn unpremultiply([r, g, b, a]: [f32; 4]) -> Color {
    if a <= 0.0 {
        return Color::TRANSPARENT;
    }
    Color::new(
        (r / a).min(1.0),
        (g / a).min(1.0),
        (b / a).min(1.0),
        a.min(1.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Circle, Line, Point};

    fn surface(w: u32, h: u32) -> RasterSurface {
        RasterSurface::new(w, h).unwrap()
    }

    #[test]
    fn fill_rect_covers_interior_only() {
        let mut surface = surface(20, 20);
        surface.fill_rect(
            Rect::new(5.0, 5.0, 15.0, 15.0),
            &Paint::Solid(Color::WHITE),
        );
        assert!((surface.pixel(10, 10).a - 1.0).abs() < 1e-2);
        assert_eq!(surface.pixel(1, 1), Color::TRANSPARENT);
        assert_eq!(surface.pixel(18, 10), Color::TRANSPARENT);
    }

    #[test]
    fn global_alpha_scales_coverage() {
        let mut surface = surface(10, 10);
        surface.set_global_alpha(0.5);
        surface.fill_rect(
            Rect::new(0.0, 0.0, 10.0, 10.0),
            &Paint::Solid(Color::WHITE),
        );
        assert!((surface.pixel(5, 5).a - 0.5).abs() < 1e-2);
    }

    #[test]
    fn circle_fill_is_round() {
        let mut surface = surface(40, 40);
        surface.fill(
            &Circle::new(Point::new(20.0, 20.0), 10.0).to_path(0.1),
            &Paint::Solid(Color::WHITE),
        );
        assert!(surface.pixel(20, 20).a > 0.99);
        // Corner of the bounding square lies outside the circle
        assert_eq!(surface.pixel(11, 11), Color::TRANSPARENT);
    }

    #[test]
    fn stroke_draws_along_segment() {
        let mut surface = surface(30, 10);
        let mut path = BezPath::new();
        path.extend(Line::new((2.0, 5.0), (28.0, 5.0)).path_elements(0.1));
        surface.stroke(&path, &StrokeStyle::new(2.0), &Paint::Solid(Color::WHITE));
        assert!(surface.pixel(15, 5).a > 0.9);
        assert_eq!(surface.pixel(15, 0), Color::TRANSPARENT);
    }

    #[test]
    fn radial_gradient_fades_towards_the_rim() {
        let mut surface = surface(40, 40);
        let paint = Paint::radial(
            Point::new(20.0, 20.0),
            10.0,
            vec![
                GradientStop::new(0.0, Color::WHITE),
                GradientStop::new(1.0, Color::TRANSPARENT),
            ],
        );
        surface.fill(&Circle::new(Point::new(20.0, 20.0), 10.0).to_path(0.1), &paint);
        let center = surface.pixel(20, 20).a;
        let rim = surface.pixel(27, 20).a;
        assert!(center > 0.8, "center alpha {center}");
        assert!(rim < 0.5, "rim alpha {rim}");
    }

    #[test]
    fn multiply_darkens_and_normal_covers() {
        let red = Paint::Solid(Color::new(1.0, 0.0, 0.0, 1.0));
        let green = Paint::Solid(Color::new(0.0, 1.0, 0.0, 1.0));
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);

        let mut multiplied = surface(10, 10);
        multiplied.fill_rect(rect, &red);
        multiplied.set_blend_mode(BlendMode::Multiply);
        multiplied.fill_rect(rect, &green);
        let px = multiplied.pixel(5, 5);
        assert!(px.r < 0.05 && px.g < 0.05, "{px:?}");

        let mut covered = surface(10, 10);
        covered.fill_rect(rect, &red);
        covered.fill_rect(rect, &green);
        let px = covered.pixel(5, 5);
        assert!(px.r < 0.05 && px.g > 0.95, "{px:?}");
    }

    #[test]
    fn clear_discards_queued_draws() {
        let mut surface = surface(10, 10);
        surface.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), &Paint::Solid(Color::WHITE));
        assert!(surface.pixel(5, 5).a > 0.99);
        surface.clear();
        assert_eq!(surface.pixel(5, 5), Color::TRANSPARENT);
    }

    #[test]
    fn offscreen_and_non_finite_paths_are_ignored() {
        let mut surface = surface(10, 10);
        surface.fill(
            &Circle::new(Point::new(500.0, 500.0), 3.0).to_path(0.1),
            &Paint::Solid(Color::WHITE),
        );
        surface.fill(
            &Circle::new(Point::new(f64::NAN, 1.0), 3.0).to_path(0.1),
            &Paint::Solid(Color::WHITE),
        );
        for y in 0..10 {
            for x in 0..10 {
                assert_eq!(surface.pixel(x, y), Color::TRANSPARENT);
            }
        }
    }

    #[test]
    fn oversized_surfaces_are_rejected() {
        let err = RasterSurface::new(70_000, 70_000).err();
        assert!(matches!(
            err,
            Some(ZineError::SurfaceTooLarge { max: MAX_RASTER_DIMENSION, .. })
        ));
        assert!(RasterSurface::new(MAX_RASTER_DIMENSION + 1, 1).is_err());

        let tiny = surface(0, 0);
        assert_eq!((tiny.width(), tiny.height()), (1, 1));
    }

    #[test]
    fn export_composites_over_background() {
        let mut surface = surface(2, 2).with_background(Color::from_hex(0x050a14));
        let img = surface.to_image();
        assert_eq!(img.get_pixel(0, 0).0, [5, 10, 20, 255]);
    }
}
