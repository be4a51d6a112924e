//! Zine Runtime - Host platform contracts and input plumbing
//!
//! Provides the building blocks an animation scope runs on:
//! - `FrameScheduler`, `TimerHost`, `EventTarget` - the host contracts, bundled as `Platform`
//! - `HeadlessPlatform` - virtual-time implementation of all three
//! - `FrameClock` - converts frame timestamps into reference-frame deltas
//! - `InputEvent` / `PointerState` - pointer input and per-frame tracking
//! - `Throttle` - minimum-interval gate for high-frequency events

mod clock;
mod event;
mod headless;
mod input;
mod platform;
mod throttle;

pub use clock::{FrameClock, MAX_DT_FRAMES, MIN_DT_FRAMES, REFERENCE_FRAME_MS};
pub use event::{EventKind, InputEvent};
pub use headless::HeadlessPlatform;
pub use input::PointerState;
pub use platform::{
    EventTarget, FrameCallback, FrameId, FrameScheduler, Listener, ListenerId, Platform,
    TimerHost, TimerId,
};
pub use throttle::Throttle;
