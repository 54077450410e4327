//! Mock hardware adapters for integration tests.
//!
//! Records every actuator call and transmitted frame so tests can assert on
//! the full command history without touching real GPIO or SPI.

use std::collections::VecDeque;

use homemesh::app::events::AppEvent;
use homemesh::app::ports::{
    ActuatorPort, EventSink, LocalReading, OccupancyPort, RadioLink, SensorPort,
};
use homemesh::control::hysteresis::Actuator;
use homemesh::error::RadioError;
use homemesh::protocol::Frame;
use homemesh::sources::FrameInbox;

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    /// Returned by every `read_current`.
    pub reading: LocalReading,
    pub calls: Vec<(Actuator, bool)>,

    // Lamp inputs
    pub motion_edges: VecDeque<bool>,
    pub motion_present: bool,
    pub smoke_ppm: f32,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            reading: LocalReading {
                temperature_c: 19.0,
                humidity_pct: 50.0,
                co2_ppm: 400.0,
                weight: 0.0,
                window_open: false,
            },
            calls: Vec::new(),
            motion_edges: VecDeque::new(),
            motion_present: false,
            smoke_ppm: 0.0,
        }
    }

    pub fn with_climate(temperature_c: f32, humidity_pct: f32, co2_ppm: f32) -> Self {
        let mut hw = Self::new();
        hw.reading.temperature_c = temperature_c;
        hw.reading.humidity_pct = humidity_pct;
        hw.reading.co2_ppm = co2_ppm;
        hw
    }

    /// Last commanded state of `which` (off if never commanded).
    pub fn is_on(&self, which: Actuator) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|(a, on)| (*a == which).then_some(*on))
            .unwrap_or(false)
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn read_current(&mut self) -> LocalReading {
        self.reading
    }
}

impl OccupancyPort for MockHardware {
    fn take_motion(&mut self) -> bool {
        self.motion_edges.pop_front().unwrap_or(false)
    }

    fn motion_present(&mut self) -> bool {
        self.motion_present
    }

    fn read_smoke_ppm(&mut self) -> f32 {
        self.smoke_ppm
    }
}

impl ActuatorPort for MockHardware {
    fn set_actuator(&mut self, which: Actuator, on: bool) {
        self.calls.push((which, on));
    }
}

// ── MockRadio ─────────────────────────────────────────────────

/// Half-duplex link that delivers every successful send into the inboxes
/// of its peers.
pub struct MockRadio<'a> {
    pub sent: Vec<Frame>,
    pub listening: bool,
    pub fail: bool,
    pub peers: Vec<&'a FrameInbox>,
}

#[allow(dead_code)]
impl<'a> MockRadio<'a> {
    pub fn new() -> Self {
        Self {
            sent: Vec::new(),
            listening: true,
            fail: false,
            peers: Vec::new(),
        }
    }

    pub fn linked(peers: Vec<&'a FrameInbox>) -> Self {
        Self {
            peers,
            ..Self::new()
        }
    }
}

impl RadioLink for MockRadio<'_> {
    fn send(&mut self, frame: Frame) -> Result<(), RadioError> {
        assert!(!self.listening, "send while listening");
        self.sent.push(frame);
        if self.fail {
            return Err(RadioError::NoAck);
        }
        for inbox in &self.peers {
            inbox.post(frame);
        }
        Ok(())
    }

    fn start_listening(&mut self) -> Result<(), RadioError> {
        self.listening = true;
        Ok(())
    }

    fn stop_listening(&mut self) -> Result<(), RadioError> {
        self.listening = false;
        Ok(())
    }
}

// ── LogSink ───────────────────────────────────────────────────

/// Collects emitted events.
pub struct LogSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl LogSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
