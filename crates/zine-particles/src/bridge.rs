//! Pointer and click input to spawn requests

use crate::behavior::BehaviorTag;
use crate::config::ScopeConfig;
use crate::rand::ParticleRng;
use glam::Vec2;
use std::rc::Rc;
use zine_runtime::{EventKind, EventTarget, InputEvent, Listener, ListenerId, PointerState, Throttle};

/// Event kinds a scope subscribes to
pub const SUBSCRIBED_KINDS: [EventKind; 5] = [
    EventKind::PointerMove,
    EventKind::PointerDown,
    EventKind::PointerUp,
    EventKind::Click,
    EventKind::Resize,
];

/// One entity the scope should create
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRequest {
    pub origin: Vec2,
    pub tag: BehaviorTag,
}

/// Listeners registered by one scope, removed together at teardown
#[derive(Default)]
pub struct ListenerSet {
    target: Option<Rc<dyn EventTarget>>,
    ids: Vec<ListenerId>,
}

impl ListenerSet {
    pub fn new(target: Rc<dyn EventTarget>) -> Self {
        Self {
            target: Some(target),
            ids: Vec::new(),
        }
    }

    /// Subscribe `listener` to every kind in [`SUBSCRIBED_KINDS`]
    pub fn subscribe(target: Rc<dyn EventTarget>, listener: Listener) -> Self {
        let mut set = Self::new(target);
        for kind in SUBSCRIBED_KINDS {
            set.add(kind, listener.clone());
        }
        set
    }

    pub fn add(&mut self, kind: EventKind, listener: Listener) {
        if let Some(target) = &self.target {
            self.ids.push(target.add_listener(kind, listener));
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Remove every registered listener. Returns how many the target still
    /// had; calling again removes nothing.
    pub fn remove_all(&mut self) -> usize {
        let Some(target) = &self.target else {
            return 0;
        };
        self.ids
            .drain(..)
            .filter(|id| target.remove_listener(*id))
            .count()
    }
}

/// Turns raw input into throttled trail and burst spawn requests
pub struct InputBridge {
    pointer: PointerState,
    throttle: Throttle,
    trail_enabled: bool,
    requires_press: bool,
    spawn_chance: f32,
    per_move: u32,
    trail_tag: BehaviorTag,
    burst_on_click: bool,
    burst_count: u32,
    move_attempts: u64,
}

impl InputBridge {
    pub fn new(config: &ScopeConfig) -> Self {
        Self {
            pointer: PointerState::new(),
            throttle: Throttle::new(config.move_throttle_ms),
            trail_enabled: config.cursor_trail_enabled,
            requires_press: config.trail_requires_press,
            spawn_chance: config.trail_spawn_chance,
            per_move: config.trail_particles_per_move,
            trail_tag: config.trail_tag(),
            burst_on_click: config.burst_on_click,
            burst_count: config.burst_count,
            move_attempts: 0,
        }
    }

    /// Fold `event` into pointer state and return what it should spawn.
    ///
    /// The pointer position is tracked on every event; only trail spawn
    /// attempts pass through the throttle.
    pub fn handle(&mut self, event: &InputEvent, rng: &mut ParticleRng) -> Vec<SpawnRequest> {
        self.pointer.process(event);
        match *event {
            InputEvent::PointerMove { position, time_ms } => self.on_move(position, time_ms, rng),
            InputEvent::Click { position, .. } if self.burst_on_click && position.is_finite() => {
                let request = SpawnRequest {
                    origin: position,
                    tag: BehaviorTag::ClickBurst,
                };
                vec![request; self.burst_count as usize]
            }
            _ => Vec::new(),
        }
    }

    fn on_move(&mut self, position: Vec2, time_ms: f64, rng: &mut ParticleRng) -> Vec<SpawnRequest> {
        if !self.trail_enabled || !position.is_finite() {
            return Vec::new();
        }
        if self.requires_press && !self.pointer.is_pressed() {
            return Vec::new();
        }
        if !self.throttle.admit(time_ms) {
            return Vec::new();
        }
        self.move_attempts += 1;
        if !rng.chance(self.spawn_chance) {
            return Vec::new();
        }
        let request = SpawnRequest {
            origin: position,
            tag: self.trail_tag,
        };
        vec![request; self.per_move as usize]
    }

    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer.position()
    }

    pub fn end_frame(&mut self) {
        self.pointer.end_frame();
    }

    /// Pointer moves that passed the throttle
    pub fn move_attempts(&self) -> u64 {
        self.move_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use zine_runtime::HeadlessPlatform;

    fn config() -> ScopeConfig {
        ScopeConfig {
            trail_spawn_chance: 1.0,
            trail_particles_per_move: 1,
            move_throttle_ms: 50.0,
            ..ScopeConfig::default()
        }
    }

    fn moved(x: f32, time_ms: f64) -> InputEvent {
        InputEvent::PointerMove {
            position: Vec2::new(x, 10.0),
            time_ms,
        }
    }

    #[test]
    fn move_attempts_are_bounded_by_the_throttle() {
        let mut bridge = InputBridge::new(&config());
        let mut rng = ParticleRng::new(5);
        // 200 events 2ms apart: far faster than the 50ms gate
        let mut spawned = 0;
        for i in 0..200 {
            spawned += bridge.handle(&moved(i as f32, i as f64 * 2.0), &mut rng).len();
        }
        let elapsed = 199.0 * 2.0;
        let bound = (elapsed / 50.0) as u64 + 1;
        assert!(bridge.move_attempts() <= bound);
        assert_eq!(bridge.move_attempts(), 8);
        assert_eq!(spawned, 8);
        // Position tracks every event, throttled or not
        assert_eq!(bridge.pointer(), Some(Vec2::new(199.0, 10.0)));
    }

    #[test]
    fn click_yields_exactly_the_burst_count() {
        let mut bridge = InputBridge::new(&ScopeConfig {
            burst_count: 8,
            ..config()
        });
        let mut rng = ParticleRng::new(5);
        let click = InputEvent::Click {
            position: Vec2::new(200.0, 300.0),
            time_ms: 0.0,
        };
        let requests = bridge.handle(&click, &mut rng);
        assert_eq!(requests.len(), 8);
        assert!(requests
            .iter()
            .all(|r| r.tag == BehaviorTag::ClickBurst && r.origin == Vec2::new(200.0, 300.0)));

        let mut off = InputBridge::new(&ScopeConfig {
            burst_on_click: false,
            ..config()
        });
        assert!(off.handle(&click, &mut rng).is_empty());
    }

    #[test]
    fn press_requirement_and_disabled_trail() {
        let mut rng = ParticleRng::new(9);
        let mut bridge = InputBridge::new(&ScopeConfig {
            trail_requires_press: true,
            ..config()
        });
        assert!(bridge.handle(&moved(1.0, 0.0), &mut rng).is_empty());
        bridge.handle(
            &InputEvent::PointerDown {
                position: Vec2::new(1.0, 10.0),
                button: 0,
                time_ms: 10.0,
            },
            &mut rng,
        );
        assert_eq!(bridge.handle(&moved(2.0, 100.0), &mut rng).len(), 1);

        let mut disabled = InputBridge::new(&ScopeConfig {
            cursor_trail_enabled: false,
            ..config()
        });
        assert!(disabled.handle(&moved(1.0, 0.0), &mut rng).is_empty());
        assert_eq!(disabled.move_attempts(), 0);
    }

    #[test]
    fn subscribe_and_remove_listeners() {
        let host = HeadlessPlatform::new();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let listener: Listener = Rc::new(move |_: &InputEvent| counter.set(counter.get() + 1));

        let mut set = ListenerSet::subscribe(host.clone(), listener);
        assert_eq!(set.len(), 5);
        assert_eq!(host.listener_count(), 5);

        host.click(1.0, 1.0);
        assert_eq!(hits.get(), 1);

        assert_eq!(set.remove_all(), 5);
        assert_eq!(set.remove_all(), 0);
        assert!(set.is_empty());
        assert_eq!(host.listener_count(), 0);
        host.click(1.0, 1.0);
        assert_eq!(hits.get(), 1);
    }
}
