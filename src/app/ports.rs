//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ NodeService / LampService (domain)
//! ```
//!
//! Driven adapters (sensors, actuator pins, radio, event sinks) implement
//! these traits.  The services consume them via generics, so the domain core
//! never touches hardware directly.

use serde::Serialize;

use crate::control::fusion::WeightedSample;
use crate::control::hysteresis::Actuator;
use crate::error::RadioError;
use crate::protocol::Frame;

// ───────────────────────────────────────────────────────────────
// Sensor ports (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// This node's own measurement, in engineering units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LocalReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub co2_ppm: f32,
    /// Trust weight of the local sensors (0.0–25.5).  Overwritten with the
    /// configured weight by the controller service.
    pub weight: f32,
    /// Window contact; only transmitted by a Window node.
    pub window_open: bool,
}

impl LocalReading {
    pub fn sample(&self) -> WeightedSample {
        WeightedSample {
            temperature_c: self.temperature_c,
            humidity_pct: self.humidity_pct,
            co2_ppm: self.co2_ppm,
            weight: self.weight,
        }
    }
}

/// Pull-based access to the climate sensors.
pub trait SensorPort {
    /// Read the current temperature, humidity, CO2 and weight.
    fn read_current(&mut self) -> LocalReading;
}

/// Motion and smoke inputs of the lamp node.
pub trait OccupancyPort {
    /// Whether a motion edge was latched since the last call (clears it).
    fn take_motion(&mut self) -> bool;

    /// Current level of the motion detector output.
    fn motion_present(&mut self) -> bool;

    /// Uncorrected smoke / gas level (ppm).
    fn read_smoke_ppm(&mut self) -> f32;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Binary outputs.
pub trait ActuatorPort {
    fn set_actuator(&mut self, which: Actuator, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Radio port
// ───────────────────────────────────────────────────────────────

/// Half-duplex frame link.
///
/// Received frames do not come through this trait: the receive interrupt
/// posts them straight into the [`FrameInbox`](crate::sources::FrameInbox).
pub trait RadioLink {
    /// Transmit one frame.  Blocks until acknowledged or retries run out.
    fn send(&mut self, frame: Frame) -> Result<(), RadioError>;

    fn start_listening(&mut self) -> Result<(), RadioError>;

    fn stop_listening(&mut self) -> Result<(), RadioError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
