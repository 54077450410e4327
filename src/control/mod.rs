//! Control subsystem: weighted sensor fusion and hysteresis actuation.

pub mod fusion;
pub mod hysteresis;
