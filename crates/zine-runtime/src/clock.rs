//! Frame clock measuring time in reference frames

/// Duration of one reference frame (60 Hz) in milliseconds
pub const REFERENCE_FRAME_MS: f64 = 1000.0 / 60.0;

/// Smallest delta handed to update rules, so every tick ages entities
pub const MIN_DT_FRAMES: f32 = 0.05;

/// Largest delta (250 ms), so a long stall doesn't fling entities across the screen
pub const MAX_DT_FRAMES: f32 = 15.0;

/// Tracks frame timestamps and reports the time since the previous frame
/// in reference frames (1.0 = 1/60 s).
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    /// Timestamp of the most recent tick in milliseconds
    last_ms: Option<f64>,
    /// Total elapsed time in milliseconds since the first tick
    pub total_ms: f64,
    /// Delta of the most recent tick in reference frames
    pub delta_frames: f32,
    /// Number of ticks so far
    pub frame_count: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to `timestamp_ms`. Call once per frame.
    ///
    /// The first tick reports exactly one reference frame.
    pub fn tick(&mut self, timestamp_ms: f64) -> f32 {
        let dt = match self.last_ms {
            None => 1.0,
            Some(last) => {
                let elapsed = (timestamp_ms - last).max(0.0);
                self.total_ms += elapsed;
                (elapsed / REFERENCE_FRAME_MS) as f32
            }
        };
        self.last_ms = Some(timestamp_ms);
        self.frame_count += 1;
        self.delta_frames = if dt.is_finite() {
            dt.clamp(MIN_DT_FRAMES, MAX_DT_FRAMES)
        } else {
            1.0
        };
        self.delta_frames
    }

    /// Forget the last timestamp, e.g. after the loop was stopped
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}
