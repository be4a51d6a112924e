//! Animation scopes: one self-contained effect bound to one surface
//!
//! A scope owns its entity store, render backend, input subscriptions and
//! timers. Platform callbacks hold only weak references back to it, so
//! dropping or disposing a scope leaves nothing behind on the host.

use crate::animator::{run_frame, AnimationLoop, FrameDriver, FrameOutcome, FramePass, StopHandle};
use crate::backend::{RenderBackend, RenderTarget};
use crate::behavior::{BehaviorTag, FrameContext, SpawnKind};
use crate::bridge::{InputBridge, ListenerSet, SpawnRequest};
use crate::config::ScopeConfig;
use crate::factory::EntityFactory;
use crate::particle::{Admission, Caps, Entity, EntityStore};
use crate::rand::ParticleRng;
use crate::trail::TrailRing;
use glam::Vec2;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, trace, warn};
use zine_core::{ScopeId, ViewportSize};
use zine_runtime::{FrameClock, InputEvent, Listener, Platform, TimerId};

/// Running totals for one scope
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScopeStats {
    pub frames: u64,
    pub spawned_ambient: u64,
    pub spawned_trail: u64,
    pub spawned_burst: u64,
    /// Ambient spawns dropped because the population was full
    pub skipped: u64,
    /// Oldest trail or burst entities replaced by newer ones
    pub evicted: u64,
    pub culled: u64,
    pub live: usize,
}

impl ScopeStats {
    fn record_spawn(&mut self, kind: SpawnKind) {
        match kind {
            SpawnKind::Ambient => self.spawned_ambient += 1,
            SpawnKind::Trail => self.spawned_trail += 1,
            SpawnKind::Burst => self.spawned_burst += 1,
        }
    }
}

/// Everything a scope has registered on its host: input listeners, timers
/// and the frame loop. Shared by the scope and its handle outside the
/// scope's `RefCell`, so a handle dropped while the scope is busy can still
/// unregister.
struct HostRegistrations {
    platform: Platform,
    listeners: RefCell<ListenerSet>,
    timers: RefCell<Vec<TimerId>>,
    frame_loop: RefCell<Option<StopHandle>>,
}

impl HostRegistrations {
    fn new(platform: &Platform) -> Self {
        Self {
            platform: platform.clone(),
            listeners: RefCell::new(ListenerSet::default()),
            timers: RefCell::new(Vec::new()),
            frame_loop: RefCell::new(None),
        }
    }

    fn is_running(&self) -> bool {
        self.frame_loop
            .borrow()
            .as_ref()
            .is_some_and(StopHandle::is_running)
    }

    fn stop_loop(&self) -> bool {
        match self.frame_loop.borrow_mut().take() {
            Some(frame_loop) => {
                frame_loop.stop();
                true
            }
            None => false,
        }
    }

    /// Stop the loop, clear every timer and remove every listener. Returns
    /// the number of listeners removed; later calls remove nothing.
    fn release(&self) -> usize {
        self.stop_loop();
        let timers = std::mem::take(&mut *self.timers.borrow_mut());
        for timer in timers {
            self.platform.timers.clear_timer(timer);
        }
        self.listeners.borrow_mut().remove_all()
    }
}

struct ScopeInner {
    id: ScopeId,
    config: ScopeConfig,
    factory: EntityFactory,
    rng: ParticleRng,
    store: EntityStore,
    backend: RenderBackend,
    bridge: InputBridge,
    clock: FrameClock,
    bounds: ViewportSize,
    trail: Option<TrailRing>,
    ambient_tags: Vec<BehaviorTag>,
    ambient_paused: bool,
    host: Rc<HostRegistrations>,
    disposed: bool,
    stats: ScopeStats,
}

impl ScopeInner {
    fn spawn(&mut self, origin: Vec2, tag: BehaviorTag) {
        let entity = self.factory.spawn(&mut self.rng, origin, tag, self.bounds);
        let kind = entity.kind;
        match self.store.admit(entity) {
            Admission::Admitted => self.stats.record_spawn(kind),
            Admission::Skipped => self.stats.skipped += 1,
            Admission::Evicted(old) => {
                self.backend.release(&old);
                self.stats.evicted += 1;
                self.stats.record_spawn(kind);
            }
        }
        self.stats.live = self.store.len();
    }

    fn spawn_requests(&mut self, requests: Vec<SpawnRequest>) {
        for request in requests {
            self.spawn(request.origin, request.tag);
        }
    }

    fn spawn_ambient(&mut self) {
        let Some(&tag) = self.rng.pick(&self.ambient_tags) else {
            return;
        };
        let origin = Vec2::new(
            self.rng.range(0.0, self.bounds.width),
            self.rng.range(0.0, self.bounds.height),
        );
        self.spawn(origin, tag);
    }

    fn ambient_tick(&mut self) {
        if !self.ambient_paused && !self.disposed {
            self.spawn_ambient();
        }
    }

    fn on_event(&mut self, event: &InputEvent) {
        if self.disposed {
            return;
        }
        if let InputEvent::Resize { size, .. } = *event {
            self.bounds = size.sanitized();
            return;
        }
        let requests = self.bridge.handle(event, &mut self.rng);
        self.spawn_requests(requests);
    }

    fn dispose(&mut self) {
        let first = !self.disposed;
        self.disposed = true;
        let listeners = self.host.release();
        let entities = self.store.drain();
        self.backend.teardown(&entities);
        if let Some(trail) = &mut self.trail {
            trail.clear();
        }
        self.stats.live = 0;
        if first {
            debug!(scope = %self.id, listeners, entities = entities.len(), "scope disposed");
        }
    }
}

impl Drop for ScopeInner {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl FrameDriver for ScopeInner {
    fn frame(&mut self, timestamp_ms: f64) -> FrameOutcome {
        if !self.backend.is_available() {
            debug!(scope = %self.id, "surface lost, stopping");
            return FrameOutcome::SurfaceLost;
        }
        let dt = self.clock.tick(timestamp_ms);
        if let Some(size) = self.backend.size() {
            self.bounds = size.sanitized();
        }

        let pointer = self.bridge.pointer();
        if let (Some(runes), Some(at)) = (self.config.runes, pointer) {
            if self.rng.chance(runes.chance) {
                self.spawn(at, BehaviorTag::GenreRune);
            }
        }

        let pass = FramePass {
            store: &mut self.store,
            ctx: FrameContext::new(dt, pointer, self.bounds, self.config.ease_factor),
            fade: self.config.fade,
            blend: self.config.blend_mode,
            trail: self.trail.as_mut(),
            cursor_glow: self.config.cursor_glow,
            connect_distance: self.config.connect_distance,
        };
        let report = run_frame(pass, &mut self.backend);
        self.bridge.end_frame();

        self.stats.frames += 1;
        self.stats.culled += report.culled as u64;
        self.stats.live = self.store.len();
        trace!(
            scope = %self.id,
            drawn = report.drawn,
            culled = report.culled,
            live = self.stats.live,
            "frame"
        );
        FrameOutcome::Continue
    }
}

/// Handle to a mounted scope.
///
/// An inert handle (no usable surface at creation) accepts every call and
/// does nothing. Dropping a handle disposes its scope.
pub struct ScopeHandle {
    id: ScopeId,
    inner: Option<Rc<RefCell<ScopeInner>>>,
    host: Option<Rc<HostRegistrations>>,
}

/// Mount an animation scope on `target`.
///
/// Never fails: a missing, detached or zero-sized target yields an inert
/// handle, and an out-of-range config is clamped. Input listeners, the
/// ambient spawn timer and any staggered initial spawns are registered
/// here; [`ScopeHandle::start`] only starts the frame loop.
pub fn create_animation_scope(
    target: Option<RenderTarget>,
    platform: &Platform,
    config: ScopeConfig,
) -> ScopeHandle {
    let id = ScopeId::new();
    let Some(target) = target.filter(RenderTarget::is_usable) else {
        warn!(scope = %id, "no usable surface, scope is inert");
        return ScopeHandle {
            id,
            inner: None,
            host: None,
        };
    };

    let violations = config.violations();
    if !violations.is_empty() {
        warn!(scope = %id, count = violations.len(), first = %violations[0], "config out of range, clamping");
    }
    let config = config.sanitized();

    let backend = RenderBackend::new(target, platform.timers.clone(), &config);
    let bounds = backend.size().unwrap_or_default().sanitized();
    let seed = config
        .seed
        .unwrap_or_else(|| id.raw().rotate_left(32) ^ platform.timers.now_ms().to_bits());
    let caps = Caps {
        ambient: config.max_ambient_entities,
        trail: config.max_trail_entities,
        burst: config.max_burst_entities(),
    };

    let host = Rc::new(HostRegistrations::new(platform));
    let inner = Rc::new(RefCell::new(ScopeInner {
        id,
        factory: EntityFactory::from_config(&config),
        rng: ParticleRng::from_seed_u64(seed),
        store: EntityStore::new(caps),
        bridge: InputBridge::new(&config),
        clock: FrameClock::new(),
        bounds,
        trail: (config.trail_curve && !backend.is_dom()).then(TrailRing::default),
        ambient_tags: config.ambient_tags(),
        ambient_paused: false,
        host: host.clone(),
        disposed: false,
        stats: ScopeStats::default(),
        backend,
        config,
    }));
    register_callbacks(&inner, platform);

    debug!(scope = %id, dom = inner.borrow().backend.is_dom(), "scope created");
    ScopeHandle {
        id,
        inner: Some(inner),
        host: Some(host),
    }
}

fn register_callbacks(inner: &Rc<RefCell<ScopeInner>>, platform: &Platform) {
    let weak = Rc::downgrade(inner);
    let listener: Listener = Rc::new(move |event: &InputEvent| {
        with_inner(&weak, |scope| scope.on_event(event));
    });

    let scope = inner.borrow();
    let host = &scope.host;
    *host.listeners.borrow_mut() = ListenerSet::subscribe(platform.events.clone(), listener);

    let has_ambient = !scope.ambient_tags.is_empty() && scope.config.max_ambient_entities > 0;
    if has_ambient {
        let weak = Rc::downgrade(inner);
        let timer = platform.timers.set_interval(
            scope.config.ambient_spawn_interval_ms,
            Rc::new(move || with_inner(&weak, ScopeInner::ambient_tick)),
        );
        host.timers.borrow_mut().push(timer);

        let stagger = scope.config.initial_stagger_ms;
        for i in 0..scope.config.initial_ambient {
            let weak = Rc::downgrade(inner);
            let timer = platform.timers.set_timeout(
                i as f64 * stagger,
                Box::new(move || with_inner(&weak, ScopeInner::spawn_ambient)),
            );
            host.timers.borrow_mut().push(timer);
        }
    }
}

/// Run `f` against a live, unborrowed scope
fn with_inner(weak: &Weak<RefCell<ScopeInner>>, f: impl FnOnce(&mut ScopeInner)) {
    if let Some(inner) = weak.upgrade() {
        if let Ok(mut scope) = inner.try_borrow_mut() {
            if !scope.disposed {
                f(&mut *scope);
            }
        }
    }
}

impl ScopeHandle {
    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn is_inert(&self) -> bool {
        self.inner.is_none()
    }

    /// Start the frame loop. No-op when already running, inert, disposed or
    /// when the surface has gone away.
    pub fn start(&self) {
        let Some(inner) = &self.inner else {
            return;
        };
        let host = {
            let Ok(mut scope) = inner.try_borrow_mut() else {
                return;
            };
            if scope.host.is_running() || scope.disposed || !scope.backend.is_available() {
                return;
            }
            scope.clock.reset();
            scope.host.clone()
        };
        let frame_loop = AnimationLoop::start(inner, host.platform.frames.clone());
        *host.frame_loop.borrow_mut() = Some(frame_loop);
        debug!(scope = %self.id, "scope started");
    }

    /// Stop the frame loop; timers and listeners stay registered
    pub fn stop(&self) {
        self.with(|scope| {
            if scope.host.stop_loop() {
                debug!(scope = %scope.id, "scope stopped");
            }
        });
    }

    /// Tear everything down. Safe to call any number of times.
    pub fn dispose(&self) {
        self.with(ScopeInner::dispose);
    }

    pub fn is_running(&self) -> bool {
        self.host.as_ref().is_some_and(|host| host.is_running())
    }

    pub fn is_disposed(&self) -> bool {
        self.read(|scope| scope.disposed).unwrap_or(true)
    }

    pub fn live_count(&self) -> usize {
        self.read(|scope| scope.store.len()).unwrap_or(0)
    }

    pub fn stats(&self) -> ScopeStats {
        self.read(|scope| scope.stats).unwrap_or_default()
    }

    /// Snapshot of live entities in draw order
    pub fn entities(&self) -> Vec<Entity> {
        self.read(|scope| scope.store.as_slice().to_vec())
            .unwrap_or_default()
    }

    pub fn pause_ambient(&self) {
        self.with(|scope| scope.ambient_paused = true);
    }

    pub fn resume_ambient(&self) {
        self.with(|scope| scope.ambient_paused = false);
    }

    /// Spawn one configured burst at `(x, y)`, as a click would
    pub fn spawn_burst(&self, x: f32, y: f32) {
        self.with(|scope| {
            if scope.disposed {
                return;
            }
            let request = SpawnRequest {
                origin: Vec2::new(x, y),
                tag: BehaviorTag::ClickBurst,
            };
            let count = scope.config.burst_count as usize;
            scope.spawn_requests(vec![request; count]);
        });
    }

    fn with(&self, f: impl FnOnce(&mut ScopeInner)) {
        if let Some(inner) = &self.inner {
            if let Ok(mut scope) = inner.try_borrow_mut() {
                f(&mut *scope);
            }
        }
    }

    fn read<T>(&self, f: impl FnOnce(&ScopeInner) -> T) -> Option<T> {
        let inner = self.inner.as_ref()?;
        let scope = inner.try_borrow().ok()?;
        Some(f(&*scope))
    }
}

impl Drop for ScopeHandle {
    fn drop(&mut self) {
        let Some(inner) = &self.inner else {
            return;
        };
        match inner.try_borrow_mut() {
            Ok(mut scope) => scope.dispose(),
            // Dropped from inside one of the scope's own callbacks. The
            // scope finishes tearing down when that callback lets go of it.
            Err(_) => {
                if let Some(host) = &self.host {
                    let listeners = host.release();
                    debug!(scope = %self.id, listeners, "scope dropped while busy");
                }
            }
        }
    }
}

/// The one mount point a view swaps scopes through
#[derive(Default)]
pub struct ScopeSlot {
    current: Option<ScopeHandle>,
}

impl ScopeSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispose the mounted scope, then create and start a new one
    pub fn mount(
        &mut self,
        target: Option<RenderTarget>,
        platform: &Platform,
        config: ScopeConfig,
    ) -> &ScopeHandle {
        self.unmount();
        let handle = create_animation_scope(target, platform, config);
        handle.start();
        self.current.insert(handle)
    }

    pub fn unmount(&mut self) {
        if let Some(old) = self.current.take() {
            old.dispose();
        }
    }

    pub fn current(&self) -> Option<&ScopeHandle> {
        self.current.as_ref()
    }
}
