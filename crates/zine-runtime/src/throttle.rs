//! Minimum-interval event gate

/// Admits at most one event per `interval_ms`.
///
/// Over any run of events spanning `elapsed` milliseconds, at most
/// `elapsed / interval_ms + 1` are admitted.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval_ms: f64,
    last_admitted: Option<f64>,
}

impl Throttle {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms: if interval_ms.is_finite() {
                interval_ms.max(0.0)
            } else {
                0.0
            },
            last_admitted: None,
        }
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    /// Returns true when an event at `now_ms` should be processed.
    ///
    /// A timestamp earlier than the last admitted one means the host clock
    /// restarted; the gate re-arms from the new timestamp.
    pub fn admit(&mut self, now_ms: f64) -> bool {
        match self.last_admitted {
            Some(last) if now_ms >= last && now_ms - last < self.interval_ms => false,
            _ => {
                self.last_admitted = Some(now_ms);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last_admitted = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_is_bounded() {
        let mut throttle = Throttle::new(50.0);
        // 1000 events, one every 2ms, over ~2 seconds
        let admitted = (0..1000).filter(|i| throttle.admit(*i as f64 * 2.0)).count();
        let elapsed = 999.0 * 2.0;
        assert!(admitted as f64 <= elapsed / 50.0 + 1.0);
        assert_eq!(admitted, 40);
    }

    #[test]
    fn test_first_event_always_admitted() {
        let mut throttle = Throttle::new(50.0);
        assert!(throttle.admit(0.0));
        assert!(!throttle.admit(49.9));
        assert!(throttle.admit(50.0));
    }

    #[test]
    fn test_clock_restart_rearms() {
        let mut throttle = Throttle::new(50.0);
        assert!(throttle.admit(1_000.0));
        assert!(throttle.admit(10.0));
        assert!(!throttle.admit(20.0));
    }

    #[test]
    fn test_zero_interval_admits_everything() {
        let mut throttle = Throttle::new(0.0);
        assert!((0..10).all(|_| throttle.admit(5.0)));
    }
}
