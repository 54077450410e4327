//! Binary output bank: heater, ventilation and light relays.
//!
//! Each output is an optional `OutputPin`: a controller node wires heater
//! and ventilation, the lamp node only the light.  Commands for an unwired
//! output are ignored.  Pin errors are logged; the commanded state is still
//! recorded so the next change is not suppressed.

use embedded_hal::digital::{Error as _, OutputPin};
use log::{debug, warn};

use crate::app::ports::ActuatorPort;
use crate::control::hysteresis::Actuator;

pub struct OutputBank<P> {
    heater: Option<P>,
    ventilation: Option<P>,
    light: Option<P>,
    state: [bool; 3],
}

impl<P: OutputPin> OutputBank<P> {
    pub fn new(heater: Option<P>, ventilation: Option<P>, light: Option<P>) -> Self {
        Self {
            heater,
            ventilation,
            light,
            state: [false; 3],
        }
    }

    /// Controller node outputs.
    pub fn climate(heater: P, ventilation: P) -> Self {
        Self::new(Some(heater), Some(ventilation), None)
    }

    /// Lamp node output.
    pub fn lamp(light: P) -> Self {
        Self::new(None, None, Some(light))
    }

    /// Last commanded state of `which`.
    pub fn is_on(&self, which: Actuator) -> bool {
        self.state[slot(which)]
    }

    fn pin(&mut self, which: Actuator) -> Option<&mut P> {
        match which {
            Actuator::Heater => self.heater.as_mut(),
            Actuator::Ventilation => self.ventilation.as_mut(),
            Actuator::Light => self.light.as_mut(),
        }
    }
}

impl<P: OutputPin> ActuatorPort for OutputBank<P> {
    fn set_actuator(&mut self, which: Actuator, on: bool) {
        let Some(pin) = self.pin(which) else {
            debug!("OUT | {which:?} not wired on this node");
            return;
        };
        let result = if on { pin.set_high() } else { pin.set_low() };
        if let Err(e) = result {
            warn!("OUT | {which:?} pin write failed: {:?}", e.kind());
        }
        self.state[slot(which)] = on;
    }
}

fn slot(which: Actuator) -> usize {
    match which {
        Actuator::Heater => 0,
        Actuator::Ventilation => 1,
        Actuator::Light => 2,
    }
}
