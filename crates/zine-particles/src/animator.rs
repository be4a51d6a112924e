//! Animation loop controller and the per-frame pass

use crate::backend::{DomBackend, RenderBackend};
use crate::behavior::{update, FrameContext};
use crate::config::FadeMode;
use crate::particle::EntityStore;
use crate::render::{draw_connections, render_entity};
use crate::trail::{draw_cursor_glow, TrailRing};
use kurbo::Rect;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use zine_core::BlendMode;
use zine_render::{Paint, Surface};
use zine_runtime::{FrameId, FrameScheduler};

/// What a driver reports after one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    /// The surface is gone; the loop stops itself
    SurfaceLost,
}

/// Work done once per display frame
pub trait FrameDriver {
    fn frame(&mut self, timestamp_ms: f64) -> FrameOutcome;
}

struct LoopState {
    frames: Rc<dyn FrameScheduler>,
    running: Cell<bool>,
    pending: Cell<Option<FrameId>>,
    frames_run: Cell<u64>,
}

impl LoopState {
    fn stop(&self) {
        self.running.set(false);
        if let Some(id) = self.pending.take() {
            self.frames.cancel_frame(id);
        }
    }
}

/// Drives a [`FrameDriver`] from the platform's frame scheduler.
///
/// The loop holds only a weak reference to its driver: dropping the driver
/// ends the loop at the next frame.
pub struct AnimationLoop;

impl AnimationLoop {
    pub fn start<D: FrameDriver + 'static>(
        driver: &Rc<RefCell<D>>,
        frames: Rc<dyn FrameScheduler>,
    ) -> StopHandle {
        let driver: Rc<RefCell<dyn FrameDriver>> = driver.clone();
        let state = Rc::new(LoopState {
            frames,
            running: Cell::new(true),
            pending: Cell::new(None),
            frames_run: Cell::new(0),
        });
        schedule(&state, Rc::downgrade(&driver));
        StopHandle { state }
    }
}

fn schedule(state: &Rc<LoopState>, driver: Weak<RefCell<dyn FrameDriver>>) {
    let loop_state = state.clone();
    let id = state
        .frames
        .request_frame(Box::new(move |timestamp| tick(&loop_state, driver, timestamp)));
    state.pending.set(Some(id));
}

fn tick(state: &Rc<LoopState>, driver: Weak<RefCell<dyn FrameDriver>>, timestamp: f64) {
    state.pending.set(None);
    if !state.running.get() {
        return;
    }
    let Some(strong) = driver.upgrade() else {
        state.running.set(false);
        return;
    };
    schedule(state, driver);

    let outcome = match strong.try_borrow_mut() {
        Ok(mut d) => d.frame(timestamp),
        // Driver busy (re-entrant host call); skip this frame
        Err(_) => FrameOutcome::Continue,
    };
    state.frames_run.set(state.frames_run.get() + 1);
    if outcome == FrameOutcome::SurfaceLost {
        state.stop();
    }
}

/// Stops its loop. Stopping is idempotent; a frame that was already
/// scheduled is cancelled and its callback body never runs.
pub struct StopHandle {
    state: Rc<LoopState>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.state.stop();
    }

    pub fn is_running(&self) -> bool {
        self.state.running.get()
    }

    pub fn frames_run(&self) -> u64 {
        self.state.frames_run.get()
    }
}

/// Frame state borrowed from a scope for one pass
pub struct FramePass<'a> {
    pub store: &'a mut EntityStore,
    pub ctx: FrameContext,
    pub fade: FadeMode,
    /// Blend mode of the translucent fade fill
    pub blend: BlendMode,
    pub trail: Option<&'a mut TrailRing>,
    pub cursor_glow: bool,
    /// Join live entities closer than this with lines
    pub connect_distance: Option<f32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub drawn: usize,
    pub culled: usize,
    pub connections: usize,
    /// The pass could not borrow its surface
    pub skipped: bool,
}

/// One frame: fade (canvas only), trail curve, update-then-render each
/// entity in spawn order, connection lines, cull expired entities, then
/// cursor glow.
pub fn run_frame(pass: FramePass<'_>, backend: &mut RenderBackend) -> FrameReport {
    match backend {
        RenderBackend::Canvas(surface) => match surface.try_borrow_mut() {
            Ok(mut surface) => canvas_frame(pass, &mut *surface),
            Err(_) => FrameReport {
                skipped: true,
                ..FrameReport::default()
            },
        },
        RenderBackend::Dom(dom) => dom_frame(pass, dom),
    }
}

fn canvas_frame(pass: FramePass<'_>, surface: &mut dyn Surface) -> FrameReport {
    let FramePass {
        store,
        ctx,
        fade,
        blend,
        trail,
        cursor_glow,
        connect_distance,
    } = pass;

    match fade {
        FadeMode::Clear => surface.clear(),
        FadeMode::Translucent(color) => {
            let size = surface.size();
            let rect = Rect::new(0.0, 0.0, size.width as f64, size.height as f64);
            if blend != BlendMode::Normal {
                surface.set_blend_mode(blend);
            }
            surface.fill_rect(rect, &Paint::Solid(color));
            if blend != BlendMode::Normal {
                surface.set_blend_mode(BlendMode::Normal);
            }
        }
    }

    if let Some(trail) = trail {
        if let Some(pointer) = ctx.pointer {
            trail.push(pointer);
        }
        trail.tick(ctx.dt);
        trail.draw(surface);
    }

    let mut drawn = 0;
    for entity in store.iter_mut() {
        update(entity, &ctx);
        if !entity.expired {
            render_entity(entity, surface);
            drawn += 1;
        }
    }
    let connections = match connect_distance {
        Some(max) => draw_connections(surface, store.as_slice(), max),
        None => 0,
    };
    let culled = store.cull_expired(|_| {});

    if cursor_glow {
        if let Some(pointer) = ctx.pointer {
            draw_cursor_glow(surface, pointer);
        }
    }

    FrameReport {
        drawn,
        culled,
        connections,
        skipped: false,
    }
}

fn dom_frame(pass: FramePass<'_>, dom: &mut DomBackend) -> FrameReport {
    let mut drawn = 0;
    for entity in pass.store.iter_mut() {
        update(entity, &pass.ctx);
        if entity.expired {
            continue;
        }
        if dom.sync(entity) {
            drawn += 1;
        } else {
            entity.expired = true;
        }
    }
    let culled = pass.store.cull_expired(|e| dom.release(e));
    FrameReport {
        drawn,
        culled,
        connections: 0,
        skipped: false,
    }
}
