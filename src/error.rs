//! Unified error types for the HomeMesh firmware.
//!
//! The domain core (codec, source table, fusion, control) never fails: bad
//! frames, silent peers and zero-weight aggregates are ordinary states.
//! Only the edges return errors: bus I/O in the adapters and configuration
//! validation.  All variants are `Copy` so they can be logged and passed
//! around without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read or returned out-of-range data.
    Sensor(SensorError),
    /// The radio transceiver failed or did not respond.
    Radio(RadioError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Radio(e) => write!(f, "radio: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// I2C transaction failed.
    BusFailed,
    /// ADC read returned an error.
    AdcReadFailed,
    /// The device answered with an unexpected chip id.
    WrongChipId(u8),
    /// Reading is outside the physically plausible range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusFailed => write!(f, "bus transaction failed"),
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::WrongChipId(id) => write!(f, "unexpected chip id 0x{id:02x}"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Radio errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioError {
    /// SPI transfer failed.
    Bus,
    /// CE pin could not be driven.
    Pin,
    /// Transceiver did not read back the configuration we wrote.
    NotPresent,
    /// No acknowledgement after all automatic retransmits.
    NoAck,
    /// Neither TX_DS nor MAX_RT was raised in time.
    Timeout,
}

impl fmt::Display for RadioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus => write!(f, "SPI transfer failed"),
            Self::Pin => write!(f, "CE pin write failed"),
            Self::NotPresent => write!(f, "transceiver not responding"),
            Self::NoAck => write!(f, "no acknowledgement"),
            Self::Timeout => write!(f, "transmit timeout"),
        }
    }
}

impl From<RadioError> for Error {
    fn from(e: RadioError) -> Self {
        Self::Radio(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
