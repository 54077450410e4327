//! Sensor subsystem: individual drivers and the port implementations built
//! from them.
//!
//! [`ClimateStation`] backs the controller node's [`SensorPort`];
//! [`LampInputs`] backs the lamp node's [`OccupancyPort`].  Both retain the
//! previous good value when a read fails, so a single flaky sensor never
//! stalls the control loop.

pub mod climate;
pub mod co2;
pub mod occupancy;

use embedded_hal::digital::InputPin;
use embedded_hal::i2c::I2c;
use log::warn;

use crate::app::ports::{LocalReading, OccupancyPort, SensorPort};
use crate::config::{DEFAULT_HUMIDITY, DEFAULT_TEMPERATURE};
use crate::error::SensorError;
use climate::Bme280;
use co2::Mq135;
use occupancy::MotionLatch;

/// A raw ADC channel.  `embedded-hal` 1.0 has no ADC trait, so the
/// platform adapter implements this one.
pub trait AnalogInput {
    fn read_raw(&mut self) -> Result<u16, SensorError>;
}

/// BME280 plus MQ-135: the climate sensors of a controller node.
pub struct ClimateStation<I2C, A> {
    bme: Bme280<I2C>,
    gas: Mq135<A>,
    window_open: bool,
    last: LocalReading,
}

impl<I2C: I2c, A: AnalogInput> ClimateStation<I2C, A> {
    pub fn new(bme: Bme280<I2C>, gas: Mq135<A>) -> Self {
        Self {
            bme,
            gas,
            window_open: false,
            last: LocalReading {
                temperature_c: DEFAULT_TEMPERATURE,
                humidity_pct: DEFAULT_HUMIDITY,
                co2_ppm: 0.0,
                weight: 0.0,
                window_open: false,
            },
        }
    }

    /// Window contact state for the next reading (Window nodes only).
    pub fn set_window_open(&mut self, open: bool) {
        self.window_open = open;
    }

    pub fn gas_mut(&mut self) -> &mut Mq135<A> {
        &mut self.gas
    }
}

impl<I2C: I2c, A: AnalogInput> SensorPort for ClimateStation<I2C, A> {
    fn read_current(&mut self) -> LocalReading {
        match self.bme.read() {
            Ok(s) => {
                self.last.temperature_c = s.temperature_c;
                self.last.humidity_pct = s.humidity_pct;
            }
            Err(e) => warn!("BME280 read failed: {e}"),
        }
        // Compensated with the climate values just read (or the last good ones).
        match self.gas.read_corrected_ppm(self.last.temperature_c, self.last.humidity_pct) {
            Ok(ppm) => self.last.co2_ppm = ppm,
            Err(e) => warn!("MQ135 read failed: {e}"),
        }
        self.last.window_open = self.window_open;
        self.last
    }
}

/// PIR detector plus MQ-135: the inputs of the lamp node.
pub struct LampInputs<P, A> {
    latch: &'static MotionLatch,
    pir: P,
    gas: Mq135<A>,
    last_smoke_ppm: f32,
}

impl<P: InputPin, A: AnalogInput> LampInputs<P, A> {
    /// `latch` is the one the PIR edge interrupt signals.
    pub fn new(latch: &'static MotionLatch, pir: P, gas: Mq135<A>) -> Self {
        Self {
            latch,
            pir,
            gas,
            last_smoke_ppm: 0.0,
        }
    }

    /// The PIR pin, e.g. to re-arm its edge interrupt.
    pub fn pir_mut(&mut self) -> &mut P {
        &mut self.pir
    }
}

impl<P: InputPin, A: AnalogInput> OccupancyPort for LampInputs<P, A> {
    fn take_motion(&mut self) -> bool {
        self.latch.take()
    }

    fn motion_present(&mut self) -> bool {
        // A failed read counts as presence so the light is not dropped.
        self.pir.is_high().unwrap_or(true)
    }

    fn read_smoke_ppm(&mut self) -> f32 {
        match self.gas.read_ppm() {
            Ok(ppm) => self.last_smoke_ppm = ppm,
            Err(e) => warn!("MQ135 read failed: {e}"),
        }
        self.last_smoke_ppm
    }
}
