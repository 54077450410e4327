//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the node cycles of the HomeMesh system: peer
//! staleness, weighted fusion, hysteresis control and the per-cycle
//! broadcast.  All interaction with hardware happens through **port traits**
//! defined in [`ports`], keeping this layer fully testable without real
//! peripherals.

pub mod broadcaster;
pub mod events;
pub mod lamp;
pub mod ports;
pub mod service;
