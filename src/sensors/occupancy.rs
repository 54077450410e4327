//! PIR occupancy tracking for the lamp node.
//!
//! The motion detector's rising edge is latched from interrupt context into
//! a [`MotionLatch`]; the lamp cycle consumes it and counts idle cycles while
//! the detector output is low.  The light stays on until
//! `cycle period × idle cycles` reaches the configured on-time.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::config::LampConfig;

/// Lock-free edge latch, written from the GPIO ISR.
pub struct MotionLatch(AtomicBool);

impl MotionLatch {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Record a motion edge.  Safe to call from interrupt context.
    pub fn signal(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Consume the latched edge, if any.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

impl Default for MotionLatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Idle-cycle counter driving the light output.
#[derive(Debug, Clone)]
pub struct OccupancyTracker {
    cycle_ms: u32,
    on_time_ms: u32,
    idle_cycles: u32,
    light_on: bool,
}

impl OccupancyTracker {
    pub fn new(config: &LampConfig) -> Self {
        Self {
            cycle_ms: config.cycle_period_ms,
            on_time_ms: config.light_on_time_ms,
            idle_cycles: 0,
            light_on: false,
        }
    }

    /// Advance one lamp cycle.
    ///
    /// `motion_seen` is the latched edge since the previous cycle,
    /// `motion_present` the current detector level.  Returns the new light
    /// state when it changed.
    pub fn update(&mut self, motion_seen: bool, motion_present: bool) -> Option<bool> {
        let before = self.light_on;
        if motion_seen {
            self.idle_cycles = 0;
            self.light_on = true;
        }
        if !motion_present {
            self.idle_cycles = self.idle_cycles.saturating_add(1);
        }
        if self.idle_ms() >= u64::from(self.on_time_ms) {
            self.light_on = false;
        }
        (self.light_on != before).then_some(self.light_on)
    }

    /// Seconds since the last motion, as carried in the Light frame.
    pub fn movement_secs(&self) -> u16 {
        u16::try_from(self.idle_ms() / 1000).unwrap_or(u16::MAX)
    }

    pub fn light_on(&self) -> bool {
        self.light_on
    }

    pub fn idle_cycles(&self) -> u32 {
        self.idle_cycles
    }

    fn idle_ms(&self) -> u64 {
        u64::from(self.cycle_ms) * u64::from(self.idle_cycles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> OccupancyTracker {
        // 200 ms cycle, 2000 ms on-time
        OccupancyTracker::new(&LampConfig::default())
    }

    #[test]
    fn motion_turns_light_on_and_idle_turns_it_off() {
        let mut t = tracker();
        assert_eq!(t.update(true, true), Some(true));
        // Detector still high: not idle.
        assert_eq!(t.update(false, true), None);
        assert_eq!(t.idle_cycles(), 0);

        for _ in 0..9 {
            assert_eq!(t.update(false, false), None);
        }
        assert!(t.light_on());
        assert_eq!(t.update(false, false), Some(false), "10 × 200 ms reaches 2000 ms");
    }

    #[test]
    fn new_motion_restarts_the_timer() {
        let mut t = tracker();
        t.update(true, false);
        for _ in 0..5 {
            t.update(false, false);
        }
        t.update(true, false);
        assert_eq!(t.idle_cycles(), 1);
        assert!(t.light_on());
    }

    #[test]
    fn movement_age_in_whole_seconds() {
        let mut t = tracker();
        t.update(true, false);
        for _ in 0..11 {
            t.update(false, false);
        }
        // 12 idle cycles × 200 ms
        assert_eq!(t.movement_secs(), 2);
    }

    #[test]
    fn latch_is_consumed_once() {
        let latch = MotionLatch::new();
        assert!(!latch.take());
        latch.signal();
        latch.signal();
        assert!(latch.take());
        assert!(!latch.take());
    }
}
