//! System configuration parameters
//!
//! Compile-time constants for the climate controller and the lamp node,
//! gathered into plain structs so services and tests can take them by value.
//! There is no runtime configuration surface and nothing is persisted.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::protocol::Role;

// --- Controller node ---

/// Time between control cycles (milliseconds).
pub const CYCLE_DELAY_MS: u32 = 500;
/// Trust weight of this node's own sensors, one decimal (0.0–25.5).
pub const SENSOR_WEIGHT: f32 = 1.5;
/// Silent cycles before a peer's reading is replaced with defaults.
pub const VALUE_RESET: u16 = 10;

/// Target temperature when no Interface node says otherwise (°C).
pub const DEFAULT_TEMPERATURE: f32 = 20.0;
/// Target relative humidity (%).
pub const DEFAULT_HUMIDITY: f32 = 50.0;
/// CO2 ceiling (ppm).
pub const DEFAULT_MAX_CO2: f32 = 1000.0;

/// Allowed temperature deviation before the heater reacts (°C).
pub const MAX_TEMPERATURE_OFFSET: f32 = 2.0;
/// Allowed humidity deviation before ventilation reacts (%).
pub const MAX_HUMIDITY_OFFSET: f32 = 10.0;
/// CO2 margin below the ceiling at which ventilation starts (ppm).
pub const MAX_CO2_OFFSET: f32 = 400.0;

// --- Lamp node ---

pub const LAMP_CYCLE_DELAY_MS: u32 = 200;
/// Light stays on this long after the last motion (milliseconds).
pub const LIGHT_ON_TIME_MS: u32 = 2000;

/// Controller node configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Role this node transmits as (Electronic or Window).
    pub role: Role,
    pub cycle_period_ms: u32,
    pub sensor_weight: f32,
    pub value_reset: u16,

    // --- Targets ---
    pub default_temperature_c: f32,
    pub default_humidity_pct: f32,
    pub default_max_co2_ppm: f32,

    // --- Hysteresis ---
    pub max_temperature_offset_c: f32,
    pub max_humidity_offset_pct: f32,
    pub max_co2_offset_ppm: f32,

    /// Emit a telemetry event every N cycles (0 = never).
    pub telemetry_every: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            role: Role::Electronic,
            cycle_period_ms: CYCLE_DELAY_MS,
            sensor_weight: SENSOR_WEIGHT,
            value_reset: VALUE_RESET,

            default_temperature_c: DEFAULT_TEMPERATURE,
            default_humidity_pct: DEFAULT_HUMIDITY,
            default_max_co2_ppm: DEFAULT_MAX_CO2,

            max_temperature_offset_c: MAX_TEMPERATURE_OFFSET,
            max_humidity_offset_pct: MAX_HUMIDITY_OFFSET,
            max_co2_offset_ppm: MAX_CO2_OFFSET,

            telemetry_every: 20, // every 10 s at 500 ms
        }
    }
}

impl NodeConfig {
    /// Interface setpoint used when the Interface node is silent, in its
    /// wire unit (°C × 10).  Exact for any target that passes
    /// [`validate`](Self::validate).
    pub fn default_setpoint(&self) -> u8 {
        (self.default_temperature_c * 10.0).round() as u8
    }

    pub fn validate(&self) -> Result<()> {
        if !matches!(self.role, Role::Electronic | Role::Window) {
            return Err(Error::Config("controller role must be electronic or window"));
        }
        if self.cycle_period_ms == 0 {
            return Err(Error::Config("cycle period must be non-zero"));
        }
        if self.value_reset == 0 {
            return Err(Error::Config("staleness bound must be non-zero"));
        }
        let values = [
            self.sensor_weight,
            self.default_temperature_c,
            self.default_humidity_pct,
            self.default_max_co2_ppm,
            self.max_temperature_offset_c,
            self.max_humidity_offset_pct,
            self.max_co2_offset_ppm,
        ];
        if !values.iter().all(|v| v.is_finite()) {
            return Err(Error::Config("targets, offsets and weight must be finite"));
        }
        if !(0.0..=25.5).contains(&self.sensor_weight) {
            return Err(Error::Config("sensor weight must be within 0.0..=25.5"));
        }
        if self.max_temperature_offset_c < 0.0
            || self.max_humidity_offset_pct < 0.0
            || self.max_co2_offset_ppm < 0.0
        {
            return Err(Error::Config("hysteresis offsets must be non-negative"));
        }
        // The default setpoint is carried as °C × 10 in one byte.
        if !(0.0..=25.5).contains(&self.default_temperature_c) {
            return Err(Error::Config("default temperature must be within 0.0..=25.5"));
        }
        Ok(())
    }
}

/// Lamp (light / occupancy) node configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LampConfig {
    pub cycle_period_ms: u32,
    pub light_on_time_ms: u32,
}

impl Default for LampConfig {
    fn default() -> Self {
        Self {
            cycle_period_ms: LAMP_CYCLE_DELAY_MS,
            light_on_time_ms: LIGHT_ON_TIME_MS,
        }
    }
}
