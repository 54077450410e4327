//! MQ-135 air-quality sensor, read as CO2.
//!
//! The sensor is a resistive divider against a 10 kΩ load read by a 12-bit
//! ADC.  Sensor resistance relative to its clean-air resistance `R0` maps to
//! ppm through the datasheet power law `ppm = A · (R/R0)^-B`.  A quadratic
//! (below 20 °C) or linear (above) factor corrects for ambient temperature
//! and humidity.

use super::AnalogInput;
use crate::error::SensorError;

const PARA: f32 = 116.602_07;
const PARB: f32 = 2.769_035;

const CORA: f32 = 0.000_35;
const CORB: f32 = 0.027_18;
const CORC: f32 = 1.395_38;
const CORD: f32 = 0.001_8;
const CORE: f32 = -0.003_333_333;
const CORF: f32 = -0.001_923_077;
const CORG: f32 = 1.130_128_2;

/// Atmospheric CO2 used for calibration (ppm).
pub const ATMOSPHERIC_CO2_PPM: f32 = 414.47;
/// Load resistance on the module (kΩ).
pub const LOAD_KOHM: f32 = 10.0;
/// Factory clean-air resistance (kΩ).
pub const DEFAULT_R0_KOHM: f32 = 27.1;

const ADC_FULL_SCALE: f32 = 4095.0;

/// MQ-135 driver over any [`AnalogInput`].
pub struct Mq135<A> {
    adc: A,
    r0_kohm: f32,
}

impl<A: AnalogInput> Mq135<A> {
    pub fn new(adc: A) -> Self {
        Self {
            adc,
            r0_kohm: DEFAULT_R0_KOHM,
        }
    }

    pub fn set_r0(&mut self, r0_kohm: f32) {
        self.r0_kohm = r0_kohm;
    }

    pub fn r0(&self) -> f32 {
        self.r0_kohm
    }

    /// Uncorrected CO2 (ppm).
    pub fn read_ppm(&mut self) -> Result<f32, SensorError> {
        let r = resistance_from_adc(self.adc.read_raw()?)?;
        Ok(ppm(r, self.r0_kohm))
    }

    /// CO2 corrected for ambient temperature and humidity (ppm).
    pub fn read_corrected_ppm(&mut self, t_c: f32, h_pct: f32) -> Result<f32, SensorError> {
        let r = resistance_from_adc(self.adc.read_raw()?)?;
        Ok(ppm(r / correction_factor(t_c, h_pct), self.r0_kohm))
    }

    /// Derive `R0` from a reading taken in fresh outdoor air and adopt it.
    pub fn calibrate(&mut self, t_c: f32, h_pct: f32) -> Result<f32, SensorError> {
        let r = resistance_from_adc(self.adc.read_raw()?)? / correction_factor(t_c, h_pct);
        self.r0_kohm = r0_for(r);
        Ok(self.r0_kohm)
    }
}

/// Sensor resistance (kΩ) for a raw 12-bit count.
pub fn resistance_from_adc(raw: u16) -> Result<f32, SensorError> {
    if raw == 0 || f32::from(raw) > ADC_FULL_SCALE {
        return Err(SensorError::OutOfRange);
    }
    Ok((ADC_FULL_SCALE / f32::from(raw) - 1.0) * LOAD_KOHM)
}

/// Temperature / humidity dependence of the sensor resistance.
pub fn correction_factor(t_c: f32, h_pct: f32) -> f32 {
    if t_c < 20.0 {
        CORA * t_c * t_c - CORB * t_c + CORC - (h_pct - 33.0) * CORD
    } else {
        CORE * t_c + CORF * h_pct + CORG
    }
}

pub fn ppm(resistance_kohm: f32, r0_kohm: f32) -> f32 {
    PARA * (resistance_kohm / r0_kohm).powf(-PARB)
}

/// Clean-air resistance that makes `resistance_kohm` read atmospheric CO2.
pub fn r0_for(resistance_kohm: f32) -> f32 {
    resistance_kohm * (ATMOSPHERIC_CO2_PPM / PARA).powf(1.0 / PARB)
}
