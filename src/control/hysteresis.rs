//! Hysteresis control of the heater and ventilation outputs.
//!
//! Two independent two-state machines:
//!
//! ```text
//!  Heater       OFF ──(T < target − offset)──▶ ON ──(T > target)──▶ OFF
//!
//!  Ventilation  OFF ──(H > target + offset)──────────────────▶ ON
//!               OFF ──(CO2 > ceiling − margin ∧ H > target − offset)──▶ ON
//!               ON  ──(H < target − offset)──────────────────▶ OFF
//! ```
//!
//! Ventilation switched on for CO2 is only switched off by low humidity; a
//! falling CO2 level alone never stops it.

use heapless::Vec;
use log::info;
use serde::{Deserialize, Serialize};

use crate::config::NodeConfig;
use crate::control::fusion::Aggregate;

/// Binary outputs driven by the nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Actuator {
    Heater,
    Ventilation,
    Light,
}

/// Controller outputs.  Both off at power-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ActuatorState {
    pub heating: bool,
    pub ventilation: bool,
}

/// Switching thresholds, derived from the configured targets and offsets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub heater_on_below_c: f32,
    pub heater_off_above_c: f32,
    pub vent_on_above_pct: f32,
    pub vent_off_below_pct: f32,
    pub vent_co2_on_above_ppm: f32,
}

impl Thresholds {
    pub fn from_config(c: &NodeConfig) -> Self {
        Self {
            heater_on_below_c: c.default_temperature_c - c.max_temperature_offset_c,
            heater_off_above_c: c.default_temperature_c,
            vent_on_above_pct: c.default_humidity_pct + c.max_humidity_offset_pct,
            vent_off_below_pct: c.default_humidity_pct - c.max_humidity_offset_pct,
            vent_co2_on_above_ppm: c.default_max_co2_ppm - c.max_co2_offset_ppm,
        }
    }
}

/// Heater and ventilation state machines.
pub struct ClimateController {
    thresholds: Thresholds,
    state: ActuatorState,
}

impl ClimateController {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            state: ActuatorState::default(),
        }
    }

    /// Advance both machines one cycle.
    ///
    /// With no aggregate the previous state is held.  Returns the outputs
    /// that changed, in the order they should be applied.
    pub fn evaluate(&mut self, aggregate: Option<&Aggregate>) -> Vec<(Actuator, bool), 2> {
        let Some(a) = aggregate else {
            return Vec::new();
        };
        let th = self.thresholds;

        // ── Heater ───────────────────────────────────────────
        let heating = if !self.state.heating && a.temperature_c < th.heater_on_below_c {
            true
        } else if self.state.heating && a.temperature_c > th.heater_off_above_c {
            false
        } else {
            self.state.heating
        };

        // ── Ventilation ──────────────────────────────────────
        let mut ventilation = self.state.ventilation;
        if !ventilation && a.humidity_pct > th.vent_on_above_pct {
            ventilation = true;
        }
        if ventilation && a.humidity_pct < th.vent_off_below_pct {
            ventilation = false;
        }
        if !ventilation && a.co2_ppm > th.vent_co2_on_above_ppm && a.humidity_pct > th.vent_off_below_pct {
            ventilation = true;
        }

        let heater = (heating != self.state.heating).then(|| {
            info!("CONTROL | heater {} (T={:.1}\u{00b0}C)", on_off(heating), a.temperature_c);
            (Actuator::Heater, heating)
        });
        let vent = (ventilation != self.state.ventilation).then(|| {
            info!(
                "CONTROL | ventilation {} (H={:.0}% CO2={:.0}ppm)",
                on_off(ventilation),
                a.humidity_pct,
                a.co2_ppm
            );
            (Actuator::Ventilation, ventilation)
        });
        self.state = ActuatorState { heating, ventilation };
        // Two candidates, two slots.
        [heater, vent].into_iter().flatten().collect()
    }

    pub fn state(&self) -> ActuatorState {
        self.state
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}
