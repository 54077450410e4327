//! Once-per-cycle broadcast of this node's own reading.
//!
//! The radio is half-duplex: the link is taken out of listening mode, the
//! frame is sent inside a critical section (the receive side must not touch
//! the transceiver mid-transfer), and listening resumes so peer frames keep
//! arriving.  Frames that arrive during the send window are lost; the
//! staleness bound tolerates that.

use log::{debug, warn};

use super::ports::{LocalReading, RadioLink};
use crate::protocol::codec;
use crate::protocol::{ClimateFields, Frame, Role, RoleReading, WindowFields};

/// Encodes and transmits this node's frame.
pub struct Broadcaster {
    role: Role,
    sent: u32,
    failed: u32,
}

impl Broadcaster {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            sent: 0,
            failed: 0,
        }
    }

    /// Encode `reading` and hand it to the radio.  Send failures are counted
    /// and logged, never propagated.
    ///
    /// Returns the frame that was put on the air.
    pub fn emit(&mut self, reading: &RoleReading, radio: &mut impl RadioLink) -> Frame {
        debug_assert_eq!(reading.role(), self.role, "broadcasting under a foreign role");
        let frame = codec::encode(reading);

        if let Err(e) = radio.stop_listening() {
            warn!("BCAST | stop listening failed: {e}");
        }
        let result = critical_section::with(|_| radio.send(frame));
        if let Err(e) = radio.start_listening() {
            warn!("BCAST | resume listening failed: {e}");
        }

        match result {
            Ok(()) => self.sent = self.sent.wrapping_add(1),
            Err(e) => {
                self.failed = self.failed.wrapping_add(1);
                debug!("BCAST | {frame} not delivered: {e}");
            }
        }
        frame
    }

    /// Frames acknowledged by the link.
    pub fn sent(&self) -> u32 {
        self.sent
    }

    pub fn failed(&self) -> u32 {
        self.failed
    }
}

/// Quantise a local measurement to the climate wire encoding.
///
/// Values saturate at the byte range; the codec then truncates to the
/// field width.
pub fn quantise(local: &LocalReading) -> ClimateFields {
    ClimateFields {
        temperature: (local.temperature_c * 5.0).round() as u8,
        co2: (local.co2_ppm / 10.0).round() as u8,
        humidity: local.humidity_pct.round() as u8,
        weight: (local.weight * 10.0).round() as u8,
    }
}

/// The frame payload a controller node transmits for `local`.
///
/// Controller nodes are Electronic or Window (enforced by
/// [`NodeConfig::validate`](crate::config::NodeConfig::validate)).
pub fn controller_reading(role: Role, local: &LocalReading) -> RoleReading {
    let climate = quantise(local);
    match role {
        Role::Window => RoleReading::Window(WindowFields {
            climate,
            open: local.window_open,
        }),
        _ => RoleReading::Electronic(climate),
    }
}
