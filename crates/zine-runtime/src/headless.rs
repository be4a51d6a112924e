//! Virtual-time host platform

use crate::clock::REFERENCE_FRAME_MS;
use crate::event::{EventKind, InputEvent};
use crate::platform::{
    EventTarget, FrameCallback, FrameId, FrameScheduler, Listener, ListenerId, Platform,
    TimerHost, TimerId,
};
use glam::Vec2;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;
use tracing::debug;
use zine_core::ViewportSize;

/// Intervals shorter than this are stretched, so `advance` always terminates
const MIN_INTERVAL_MS: f64 = 1.0;

/// Slack when comparing virtual timestamps built from repeated float sums
const TIME_EPSILON_MS: f64 = 1e-6;

enum TimerTask {
    Interval {
        period_ms: f64,
        callback: Rc<dyn Fn()>,
    },
    Timeout(Box<dyn FnOnce()>),
}

struct TimerEntry {
    due_ms: f64,
    task: TimerTask,
}

/// Implements every platform contract against a virtual clock.
///
/// Nothing happens until [`advance`](Self::advance) is called. Frames fire
/// on a fixed vsync grid (60 Hz by default); timers fire at their due time,
/// ahead of a frame due at the same instant. While the platform is not
/// visible, frame requests stay pending and timers keep running.
pub struct HeadlessPlatform {
    now_ms: Cell<f64>,
    frame_interval_ms: f64,
    visible: Cell<bool>,
    next_id: Cell<u64>,
    frames: RefCell<Vec<(FrameId, FrameCallback)>>,
    running_batch: Cell<bool>,
    cancelled_in_batch: RefCell<HashSet<FrameId>>,
    timers: RefCell<BTreeMap<TimerId, TimerEntry>>,
    listeners: RefCell<Vec<(ListenerId, EventKind, Listener)>>,
    frames_fired: Cell<u64>,
}

impl HeadlessPlatform {
    pub fn new() -> Rc<Self> {
        Self::with_frame_interval(REFERENCE_FRAME_MS)
    }

    pub fn with_frame_interval(frame_interval_ms: f64) -> Rc<Self> {
        Rc::new(Self {
            now_ms: Cell::new(0.0),
            frame_interval_ms: frame_interval_ms.max(MIN_INTERVAL_MS),
            visible: Cell::new(true),
            next_id: Cell::new(1),
            frames: RefCell::new(Vec::new()),
            running_batch: Cell::new(false),
            cancelled_in_batch: RefCell::new(HashSet::new()),
            timers: RefCell::new(BTreeMap::new()),
            listeners: RefCell::new(Vec::new()),
            frames_fired: Cell::new(0),
        })
    }

    /// Bundle this platform as the services a scope runs on
    pub fn platform(self: &Rc<Self>) -> Platform {
        Platform {
            frames: self.clone(),
            timers: self.clone(),
            events: self.clone(),
        }
    }

    pub fn now(&self) -> f64 {
        self.now_ms.get()
    }

    /// Hidden views receive no frame callbacks; timers keep running
    pub fn set_visible(&self, visible: bool) {
        if self.visible.replace(visible) != visible {
            debug!(visible, now_ms = self.now(), "visibility changed");
        }
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.borrow().len()
    }

    pub fn timer_count(&self) -> usize {
        self.timers.borrow().len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn listener_count_for(&self, kind: EventKind) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .count()
    }

    /// Number of frame batches delivered so far
    pub fn frames_fired(&self) -> u64 {
        self.frames_fired.get()
    }

    /// Advance virtual time by `ms`, firing timers and frames in time order
    pub fn advance(&self, ms: f64) {
        let target = self.now_ms.get() + ms.max(0.0);
        let limit = target + TIME_EPSILON_MS;
        loop {
            let next_timer = self.next_timer();
            let next_frame = self.next_vsync();
            match (next_timer, next_frame) {
                (Some((due, id)), frame) if due <= limit && frame.map_or(true, |f| due <= f) => {
                    self.now_ms.set(due.max(self.now_ms.get()));
                    self.fire_timer(id);
                }
                (_, Some(frame)) if frame <= limit => {
                    self.now_ms.set(frame);
                    self.fire_frames();
                }
                _ => break,
            }
        }
        self.now_ms.set(target.max(self.now_ms.get()));
    }

    /// Advance by whole frames
    pub fn advance_frames(&self, frames: u32) {
        self.advance(self.frame_interval_ms * frames as f64);
    }

    /// Deliver an event to every listener registered for its kind
    pub fn dispatch(&self, event: InputEvent) {
        let targets: Vec<(ListenerId, Listener)> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, kind, _)| *kind == event.kind())
            .map(|(id, _, l)| (*id, l.clone()))
            .collect();
        for (id, listener) in targets {
            // A listener removed by an earlier one in this dispatch is skipped
            let still_registered = self.listeners.borrow().iter().any(|(i, _, _)| *i == id);
            if still_registered {
                listener(&event);
            }
        }
    }

    pub fn pointer_move(&self, x: f32, y: f32) {
        self.dispatch(InputEvent::PointerMove {
            position: Vec2::new(x, y),
            time_ms: self.now(),
        });
    }

    pub fn pointer_down(&self, x: f32, y: f32) {
        self.dispatch(InputEvent::PointerDown {
            position: Vec2::new(x, y),
            button: 0,
            time_ms: self.now(),
        });
    }

    pub fn pointer_up(&self, x: f32, y: f32) {
        self.dispatch(InputEvent::PointerUp {
            position: Vec2::new(x, y),
            button: 0,
            time_ms: self.now(),
        });
    }

    pub fn click(&self, x: f32, y: f32) {
        self.dispatch(InputEvent::Click {
            position: Vec2::new(x, y),
            time_ms: self.now(),
        });
    }

    pub fn resize(&self, size: ViewportSize) {
        self.dispatch(InputEvent::Resize {
            size,
            time_ms: self.now(),
        });
    }

    fn alloc_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    fn next_timer(&self) -> Option<(f64, TimerId)> {
        self.timers
            .borrow()
            .iter()
            .map(|(id, entry)| (entry.due_ms, *id))
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
    }

    fn next_vsync(&self) -> Option<f64> {
        if !self.visible.get() || self.frames.borrow().is_empty() {
            return None;
        }
        let now = self.now_ms.get();
        let slot = ((now + TIME_EPSILON_MS) / self.frame_interval_ms).floor() + 1.0;
        Some(slot * self.frame_interval_ms)
    }

    fn fire_timer(&self, id: TimerId) {
        let callback: Option<Box<dyn FnOnce()>> = {
            let mut timers = self.timers.borrow_mut();
            let is_interval = match timers.get(&id) {
                Some(entry) => matches!(entry.task, TimerTask::Interval { .. }),
                None => return,
            };
            if is_interval {
                timers.get_mut(&id).and_then(|entry| match &entry.task {
                    TimerTask::Interval {
                        period_ms,
                        callback,
                    } => {
                        entry.due_ms += *period_ms;
                        let cb = callback.clone();
                        Some(Box::new(move || cb()) as Box<dyn FnOnce()>)
                    }
                    TimerTask::Timeout(_) => None,
                })
            } else {
                match timers.remove(&id).map(|entry| entry.task) {
                    Some(TimerTask::Timeout(cb)) => Some(cb),
                    _ => None,
                }
            }
        };
        if let Some(cb) = callback {
            cb();
        }
    }

    fn fire_frames(&self) {
        let batch = std::mem::take(&mut *self.frames.borrow_mut());
        self.frames_fired.set(self.frames_fired.get() + 1);
        self.running_batch.set(true);
        let timestamp = self.now_ms.get();
        for (id, callback) in batch {
            if self.cancelled_in_batch.borrow().contains(&id) {
                continue;
            }
            callback(timestamp);
        }
        self.running_batch.set(false);
        self.cancelled_in_batch.borrow_mut().clear();
    }
}

impl FrameScheduler for HeadlessPlatform {
    fn request_frame(&self, callback: FrameCallback) -> FrameId {
        let id = FrameId(self.alloc_id());
        self.frames.borrow_mut().push((id, callback));
        id
    }

    fn cancel_frame(&self, id: FrameId) {
        self.frames.borrow_mut().retain(|(i, _)| *i != id);
        if self.running_batch.get() {
            self.cancelled_in_batch.borrow_mut().insert(id);
        }
    }
}

impl TimerHost for HeadlessPlatform {
    fn now_ms(&self) -> f64 {
        self.now()
    }

    fn set_interval(&self, period_ms: f64, callback: Rc<dyn Fn()>) -> TimerId {
        let id = TimerId(self.alloc_id());
        let period_ms = if period_ms.is_finite() {
            period_ms.max(MIN_INTERVAL_MS)
        } else {
            MIN_INTERVAL_MS
        };
        self.timers.borrow_mut().insert(
            id,
            TimerEntry {
                due_ms: self.now() + period_ms,
                task: TimerTask::Interval {
                    period_ms,
                    callback,
                },
            },
        );
        id
    }

    fn set_timeout(&self, delay_ms: f64, callback: Box<dyn FnOnce()>) -> TimerId {
        let id = TimerId(self.alloc_id());
        let delay_ms = if delay_ms.is_finite() {
            delay_ms.max(0.0)
        } else {
            0.0
        };
        self.timers.borrow_mut().insert(
            id,
            TimerEntry {
                due_ms: self.now() + delay_ms,
                task: TimerTask::Timeout(callback),
            },
        );
        id
    }

    fn clear_timer(&self, id: TimerId) {
        self.timers.borrow_mut().remove(&id);
    }
}

impl EventTarget for HeadlessPlatform {
    fn add_listener(&self, kind: EventKind, listener: Listener) -> ListenerId {
        let id = ListenerId(self.alloc_id());
        self.listeners.borrow_mut().push((id, kind, listener));
        id
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(i, _, _)| *i != id);
        listeners.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_fire_once_per_vsync() {
        let host = HeadlessPlatform::new();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        host.request_frame(Box::new(move |_| h.set(h.get() + 1)));
        assert_eq!(host.pending_frames(), 1);

        host.advance(REFERENCE_FRAME_MS * 3.0);
        assert_eq!(hits.get(), 1);
        assert_eq!(host.pending_frames(), 0);
    }

    #[test]
    fn cancelled_frame_never_runs() {
        let host = HeadlessPlatform::new();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let id = host.request_frame(Box::new(move |_| h.set(h.get() + 1)));
        host.cancel_frame(id);
        host.advance(100.0);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn cancel_within_batch_skips_later_callback() {
        let host = HeadlessPlatform::new();
        let hits = Rc::new(Cell::new(0));
        let victim: Rc<Cell<Option<FrameId>>> = Rc::new(Cell::new(None));

        let (h2, v2, host2) = (hits.clone(), victim.clone(), host.clone());
        host.request_frame(Box::new(move |_| {
            if let Some(id) = v2.get() {
                host2.cancel_frame(id);
            }
            h2.set(h2.get() + 1);
        }));
        let h3 = hits.clone();
        let id = host.request_frame(Box::new(move |_| h3.set(h3.get() + 10)));
        victim.set(Some(id));

        host.advance(REFERENCE_FRAME_MS);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn hidden_platform_withholds_frames_but_runs_timers() {
        let host = HeadlessPlatform::new();
        let frames = Rc::new(Cell::new(0));
        let ticks = Rc::new(Cell::new(0));
        let f = frames.clone();
        host.request_frame(Box::new(move |_| f.set(f.get() + 1)));
        let t = ticks.clone();
        host.set_interval(10.0, Rc::new(move || t.set(t.get() + 1)));

        host.set_visible(false);
        host.advance(100.0);
        assert_eq!(frames.get(), 0);
        assert_eq!(ticks.get(), 10);

        host.set_visible(true);
        host.advance(REFERENCE_FRAME_MS);
        assert_eq!(frames.get(), 1);
    }

    #[test]
    fn interval_and_timeout_fire_on_schedule() {
        let host = HeadlessPlatform::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l = log.clone();
        let interval = host.set_interval(100.0, Rc::new(move || l.borrow_mut().push("tick")));
        let l = log.clone();
        host.set_timeout(150.0, Box::new(move || l.borrow_mut().push("once")));

        host.advance(250.0);
        assert_eq!(*log.borrow(), vec!["tick", "once", "tick"]);
        assert_eq!(host.timer_count(), 1);

        host.clear_timer(interval);
        host.advance(1_000.0);
        assert_eq!(log.borrow().len(), 3);
        assert_eq!(host.timer_count(), 0);
        assert!((host.now() - 1_250.0).abs() < 1e-9);
    }

    #[test]
    fn listeners_receive_matching_events_until_removed() {
        let host = HeadlessPlatform::new();
        let clicks = Rc::new(Cell::new(0));
        let c = clicks.clone();
        let id = host.add_listener(EventKind::Click, Rc::new(move |_| c.set(c.get() + 1)));

        host.click(1.0, 1.0);
        host.pointer_move(1.0, 1.0);
        assert_eq!(clicks.get(), 1);
        assert_eq!(host.listener_count_for(EventKind::Click), 1);

        assert!(host.remove_listener(id));
        assert!(!host.remove_listener(id));
        host.click(1.0, 1.0);
        assert_eq!(clicks.get(), 1);
        assert_eq!(host.listener_count(), 0);
    }
}
