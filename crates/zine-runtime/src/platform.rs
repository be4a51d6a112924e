//! Host platform contracts
//!
//! All three contracts take `&self`: the host's frame scheduler, timer queue
//! and window are shared by every scope mounted on the page. Callbacks are
//! invoked on the single UI thread and never re-entrantly with respect to
//! one another.

use crate::event::{EventKind, InputEvent};
use std::rc::Rc;

/// Pending frame request, as returned by `request_frame`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub u64);

/// Interval or timeout registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Event listener registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Invoked once with the frame timestamp in milliseconds
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// Invoked for every event of the subscribed kind
pub type Listener = Rc<dyn Fn(&InputEvent)>;

/// Display-synchronised frame callbacks (`requestAnimationFrame`)
pub trait FrameScheduler {
    /// Run `callback` before the next repaint. Hosts may withhold frames
    /// while the view is hidden.
    fn request_frame(&self, callback: FrameCallback) -> FrameId;

    /// Cancel a pending request; unknown or already-run ids are ignored
    fn cancel_frame(&self, id: FrameId);
}

/// Wall-clock timers (`setInterval` / `setTimeout`)
pub trait TimerHost {
    /// Current host time in milliseconds
    fn now_ms(&self) -> f64;

    fn set_interval(&self, period_ms: f64, callback: Rc<dyn Fn()>) -> TimerId;

    fn set_timeout(&self, delay_ms: f64, callback: Box<dyn FnOnce()>) -> TimerId;

    /// Clear an interval or timeout; unknown or already-fired ids are ignored
    fn clear_timer(&self, id: TimerId);
}

/// Something input listeners attach to (the window, or a container element)
pub trait EventTarget {
    fn add_listener(&self, kind: EventKind, listener: Listener) -> ListenerId;

    /// Returns false when the listener was not registered
    fn remove_listener(&self, id: ListenerId) -> bool;
}

/// The host services an animation scope runs on
#[derive(Clone)]
pub struct Platform {
    pub frames: Rc<dyn FrameScheduler>,
    pub timers: Rc<dyn TimerHost>,
    pub events: Rc<dyn EventTarget>,
}
