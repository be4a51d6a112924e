//! Zine Render - Drawing surfaces and overlay layers
//!
//! The particle engine draws through two contracts:
//! - [`Surface`] - a 2D immediate-mode canvas (paths, paints, alpha, transform stack)
//! - [`DomLayer`] - a container of CSS-styled overlay nodes
//!
//! Implementations shipped here:
//! - [`RecordingSurface`] - logs every draw call, for tests and draw-order checks
//! - [`RasterSurface`] - `vello_cpu` rasteriser into a pixmap, exportable to PNG
//! - [`HeadlessDom`] - in-memory node container

mod dom;
mod paint;
mod raster;
mod recording;
mod surface;

pub use dom::{DomLayer, HeadlessDom, NodeStyle};
pub use paint::{GradientStop, LinearGradient, Paint, RadialGradient, StrokeStyle};
pub use raster::{RasterSurface, MAX_RASTER_DIMENSION};
pub use recording::{DrawCall, PaintKind, RecordingSurface};
pub use surface::{DrawState, StateStack, Surface};

pub use kurbo;
