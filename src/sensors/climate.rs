//! Bosch BME280 temperature / humidity sensor over I2C.
//!
//! Uses the datasheet's fixed-point compensation (section 4.2.3).  Pressure
//! is not read; nothing in the mesh carries it.

use embedded_hal::i2c::I2c;
use log::debug;

use crate::error::SensorError;

/// Default address with SDO pulled high.
pub const ADDRESS: u8 = 0x77;
pub const CHIP_ID: u8 = 0x60;

const REG_CALIB_00: u8 = 0x88;
const REG_CHIP_ID: u8 = 0xD0;
const REG_CALIB_26: u8 = 0xE1;
const REG_CTRL_HUM: u8 = 0xF2;
const REG_CTRL_MEAS: u8 = 0xF4;
const REG_TEMP_MSB: u8 = 0xFA;

/// Humidity oversampling ×1.
const CTRL_HUM: u8 = 0x01;
/// Temperature ×1, pressure ×16, normal mode.
const CTRL_MEAS: u8 = 0x3F;

/// Factory trimming parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Calibration {
    pub t1: u16,
    pub t2: i16,
    pub t3: i16,
    pub h1: u8,
    pub h2: i16,
    pub h3: u8,
    pub h4: i16,
    pub h5: i16,
    pub h6: i8,
}

impl Calibration {
    /// Decode the two calibration blocks (`0x88..=0xA1`, `0xE1..=0xE7`).
    pub fn from_blocks(tp: &[u8; 26], h: &[u8; 7]) -> Self {
        let le_u16 = |lo: u8, hi: u8| u16::from_le_bytes([lo, hi]);
        let le_i16 = |lo: u8, hi: u8| i16::from_le_bytes([lo, hi]);
        Self {
            t1: le_u16(tp[0], tp[1]),
            t2: le_i16(tp[2], tp[3]),
            t3: le_i16(tp[4], tp[5]),
            h1: tp[25],
            h2: le_i16(h[0], h[1]),
            h3: h[2],
            // H4 and H5 share the nibbles of 0xE5.
            h4: (i16::from(h[3] as i8) << 4) | i16::from(h[4] & 0x0F),
            h5: (i16::from(h[5] as i8) << 4) | i16::from(h[4] >> 4),
            h6: h[6] as i8,
        }
    }
}

/// Temperature compensation.  Returns `(t_fine, hundredths of °C)`.
pub fn compensate_temperature(cal: &Calibration, adc_t: i32) -> (i32, i32) {
    let t1 = i32::from(cal.t1);
    let var1 = (((adc_t >> 3) - (t1 << 1)) * i32::from(cal.t2)) >> 11;
    let var2 = (((((adc_t >> 4) - t1) * ((adc_t >> 4) - t1)) >> 12) * i32::from(cal.t3)) >> 14;
    let t_fine = var1 + var2;
    (t_fine, (t_fine * 5 + 128) >> 8)
}

/// Humidity compensation.  Returns %RH in Q22.10.
pub fn compensate_humidity(cal: &Calibration, adc_h: i32, t_fine: i32) -> u32 {
    let mut v = t_fine - 76_800;
    v = (((adc_h << 14) - (i32::from(cal.h4) << 20) - (i32::from(cal.h5) * v) + 16_384) >> 15)
        * (((((((v * i32::from(cal.h6)) >> 10) * (((v * i32::from(cal.h3)) >> 11) + 32_768)) >> 10)
            + 2_097_152)
            * i32::from(cal.h2)
            + 8_192)
            >> 14);
    v -= ((((v >> 15) * (v >> 15)) >> 7) * i32::from(cal.h1)) >> 4;
    v = v.clamp(0, 419_430_400);
    (v >> 12) as u32
}

/// One compensated measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateSample {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

pub struct Bme280<I2C> {
    i2c: I2C,
    address: u8,
    cal: Calibration,
}

impl<I2C: I2c> Bme280<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            cal: Calibration::default(),
        }
    }

    /// Check the chip id, load calibration and start normal-mode sampling.
    pub fn init(&mut self) -> Result<(), SensorError> {
        let mut id = [0u8; 1];
        self.read_regs(REG_CHIP_ID, &mut id)?;
        if id[0] != CHIP_ID {
            return Err(SensorError::WrongChipId(id[0]));
        }

        let mut tp = [0u8; 26];
        let mut h = [0u8; 7];
        self.read_regs(REG_CALIB_00, &mut tp)?;
        self.read_regs(REG_CALIB_26, &mut h)?;
        self.cal = Calibration::from_blocks(&tp, &h);
        debug!("BME280 calibration: {:?}", self.cal);

        // ctrl_hum only takes effect after a write to ctrl_meas.
        self.write_reg(REG_CTRL_HUM, CTRL_HUM)?;
        self.write_reg(REG_CTRL_MEAS, CTRL_MEAS)
    }

    pub fn calibration(&self) -> &Calibration {
        &self.cal
    }

    pub fn read(&mut self) -> Result<ClimateSample, SensorError> {
        // Burst 0xFA..=0xFE: temperature (20 bit), then humidity (16 bit).
        let mut buf = [0u8; 5];
        self.read_regs(REG_TEMP_MSB, &mut buf)?;

        let adc_t = (i32::from(buf[0]) << 12) | (i32::from(buf[1]) << 4) | (i32::from(buf[2]) >> 4);
        let adc_h = (i32::from(buf[3]) << 8) | i32::from(buf[4]);

        let (t_fine, centi_c) = compensate_temperature(&self.cal, adc_t);
        let humidity = compensate_humidity(&self.cal, adc_h, t_fine);
        Ok(ClimateSample {
            temperature_c: centi_c as f32 / 100.0,
            humidity_pct: humidity as f32 / 1024.0,
        })
    }

    fn read_regs(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), SensorError> {
        self.i2c
            .write_read(self.address, &[reg], buf)
            .map_err(|_| SensorError::BusFailed)
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), SensorError> {
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(|_| SensorError::BusFailed)
    }
}
