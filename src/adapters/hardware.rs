//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Pairs a node's input side (a [`ClimateStation`](crate::sensors::ClimateStation)
//! or [`LampInputs`](crate::sensors::LampInputs)) with its [`OutputBank`],
//! so a service can take one `&mut` that satisfies both the input port and
//! [`ActuatorPort`].

use embedded_hal::digital::OutputPin;

use super::actuators::OutputBank;
use crate::app::ports::{ActuatorPort, LocalReading, OccupancyPort, SensorPort};
use crate::control::hysteresis::Actuator;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<S, P> {
    inputs: S,
    outputs: OutputBank<P>,
}

impl<S, P: OutputPin> HardwareAdapter<S, P> {
    pub fn new(inputs: S, outputs: OutputBank<P>) -> Self {
        Self { inputs, outputs }
    }

    pub fn inputs_mut(&mut self) -> &mut S {
        &mut self.inputs
    }
}

// ── Input ports ───────────────────────────────────────────────

impl<S: SensorPort, P> SensorPort for HardwareAdapter<S, P> {
    fn read_current(&mut self) -> LocalReading {
        self.inputs.read_current()
    }
}

impl<S: OccupancyPort, P> OccupancyPort for HardwareAdapter<S, P> {
    fn take_motion(&mut self) -> bool {
        self.inputs.take_motion()
    }

    fn motion_present(&mut self) -> bool {
        self.inputs.motion_present()
    }

    fn read_smoke_ppm(&mut self) -> f32 {
        self.inputs.read_smoke_ppm()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<S, P: OutputPin> ActuatorPort for HardwareAdapter<S, P> {
    fn set_actuator(&mut self, which: Actuator, on: bool) {
        self.outputs.set_actuator(which, on);
    }
}
